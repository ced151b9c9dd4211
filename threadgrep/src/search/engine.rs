use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use tracing::{debug, info};

use super::partition::partition;
use super::scanner::LineScanner;
use super::walker::collect_files;
use crate::config::ScanConfig;
use crate::errors::ScanResult;
use crate::results::{ScanOutput, WorkerResult};

/// Enumerates the configured root and scans it with the configured number of workers
pub fn search(config: &ScanConfig) -> ScanResult<ScanOutput> {
    info!(
        "Starting scan for {:?} in {}",
        config.search_string,
        config.root_path.display()
    );

    let files = collect_files(&config.root_path)?;
    let output = dispatch(files, config.thread_count.get(), &config.search_string)?;

    info!(
        "Scan complete. {} files searched by {} workers",
        output.files_searched,
        output.workers.len()
    );

    Ok(output)
}

/// Scans `files` with `worker_count` concurrent workers.
///
/// The files are split into one contiguous partition per worker and each
/// partition runs on its own thread of a pool sized to `worker_count`. Returns
/// once every worker has finished, with results in worker index order.
pub fn dispatch(
    files: Vec<PathBuf>,
    worker_count: usize,
    search_string: &str,
) -> ScanResult<ScanOutput> {
    let files_searched = files.len();
    let partitions = partition(files, worker_count)?;

    let pool = ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .thread_name(|i| format!("threadgrep-worker-{}", i))
        .build()?;

    debug!(
        "Dispatching {} files across {} workers",
        files_searched, worker_count
    );

    let scanner = LineScanner::new(search_string);
    let workers: Vec<WorkerResult> = pool.install(|| {
        partitions
            .par_iter()
            .map(|p| scanner.scan_partition(p))
            .collect()
    });

    Ok(ScanOutput {
        workers,
        files_searched,
    })
}
