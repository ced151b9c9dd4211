use std::path::PathBuf;

use crate::errors::{ScanError, ScanResult};
use crate::results::WorkerId;

/// Contiguous run of the enumerated files owned by one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePartition {
    pub worker: WorkerId,
    pub files: Vec<PathBuf>,
}

/// Splits `files` into `worker_count` contiguous partitions.
///
/// Every worker gets `files.len() / worker_count` files, except the last one
/// which also takes the remainder. With fewer files than workers the leading
/// partitions are empty. Partition `i` belongs to `WorkerId(i)`.
pub fn partition(files: Vec<PathBuf>, worker_count: usize) -> ScanResult<Vec<FilePartition>> {
    if worker_count == 0 {
        return Err(ScanError::invalid_thread_count(worker_count.to_string()));
    }

    let base = files.len() / worker_count;
    let mut remaining = files.into_iter();

    let partitions = (0..worker_count)
        .map(|i| {
            let files: Vec<PathBuf> = if i + 1 == worker_count {
                remaining.by_ref().collect()
            } else {
                remaining.by_ref().take(base).collect()
            };
            FilePartition {
                worker: WorkerId(i),
                files,
            }
        })
        .collect();

    Ok(partitions)
}
