/// Parallel scan pipeline.
///
/// The stages run in this order for one scan:
///
/// 1. [`walker::collect_files`] lists the regular files under the root once.
/// 2. [`partition::partition`] cuts that list into one contiguous slice per
///    worker, the last worker taking the remainder.
/// 3. [`engine::dispatch`] runs a [`LineScanner`] over every slice on a rayon
///    pool sized to the worker count and joins the results in worker order.
///
/// Workers share nothing mutable. Each owns its partition and returns its own
/// [`WorkerResult`](crate::results::WorkerResult), so no locking is needed.
pub mod engine;
pub mod partition;
pub mod scanner;
pub mod walker;

pub use engine::{dispatch, search};
pub use partition::{partition, FilePartition};
pub use scanner::LineScanner;
pub use walker::collect_files;
