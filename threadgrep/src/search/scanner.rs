use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};

use super::partition::FilePartition;
use crate::results::{
    MatchRecord, SkipStage, SkippedFile, WorkerId, WorkerOutcome, WorkerResult,
};

const BUFFER_CAPACITY: usize = 65536;

/// Scans partitions for lines containing a literal string.
///
/// Matching is a plain, case-sensitive substring test on each line. A scanner
/// only reads its inputs, so one instance can serve every worker at once.
#[derive(Debug, Clone)]
pub struct LineScanner {
    search_string: String,
}

impl LineScanner {
    pub fn new(search_string: impl Into<String>) -> Self {
        Self {
            search_string: search_string.into(),
        }
    }

    pub fn search_string(&self) -> &str {
        &self.search_string
    }

    /// Scans every file of a partition in order.
    ///
    /// Files that cannot be opened or read are recorded as skipped and the
    /// scan moves on. If no line of any file matched, the outcome is
    /// [`WorkerOutcome::NoMatches`].
    pub fn scan_partition(&self, partition: &FilePartition) -> WorkerResult {
        debug!(
            "Worker {} scanning {} files",
            partition.worker,
            partition.files.len()
        );

        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for path in &partition.files {
            if let Err((stage, err)) = self.scan_file(partition.worker, path, &mut records) {
                debug!("Worker {} skipped {}: {}", partition.worker, path.display(), err);
                skipped.push(SkippedFile {
                    path: path.clone(),
                    stage,
                    reason: err.to_string(),
                });
            }
        }

        WorkerResult {
            worker: partition.worker,
            outcome: WorkerOutcome::from_records(records),
            skipped,
        }
    }

    /// Appends one record per matching line of `path` to `records`.
    ///
    /// On a read error part way through, records for the lines read so far
    /// stay in `records`.
    fn scan_file(
        &self,
        worker: WorkerId,
        path: &Path,
        records: &mut Vec<MatchRecord>,
    ) -> Result<(), (SkipStage, io::Error)> {
        trace!("Scanning {}", path.display());

        let file = File::open(path).map_err(|e| (SkipStage::Open, e))?;
        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
        let mut buffer = Vec::with_capacity(256);
        let mut line_number = 0;

        loop {
            buffer.clear();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|e| (SkipStage::Read, e))?;
            if read == 0 {
                break;
            }
            line_number += 1;

            let line = String::from_utf8_lossy(trim_line_ending(&buffer));
            if line.contains(self.search_string.as_str()) {
                records.push(MatchRecord {
                    worker,
                    path: path.to_path_buf(),
                    line_number,
                    line: line.into_owned(),
                });
            }
        }

        Ok(())
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
