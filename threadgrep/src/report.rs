use itertools::Itertools;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{ScanError, ScanResult};
use crate::results::{MatchRecord, ScanOutput, WorkerId, WorkerResult};

/// Matches found in one file, ordered by line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatches {
    pub path: PathBuf,
    pub matches: Vec<MatchRecord>,
}

/// Matches grouped by file, most matches first.
///
/// Files with the same number of matches are ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsReport {
    pub files: Vec<FileMatches>,
}

impl ResultsReport {
    /// Groups records by file and orders them for the results report
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a MatchRecord>) -> Self {
        let mut by_path: BTreeMap<&Path, Vec<MatchRecord>> = BTreeMap::new();
        for record in records {
            by_path
                .entry(record.path.as_path())
                .or_default()
                .push(record.clone());
        }

        let mut files: Vec<FileMatches> = by_path
            .into_iter()
            .map(|(path, mut matches)| {
                matches.sort_by_key(|m| m.line_number);
                FileMatches {
                    path: path.to_path_buf(),
                    matches,
                }
            })
            .collect();

        // Stable, so equal counts stay in path order
        files.sort_by_key(|f| Reverse(f.matches.len()));

        ResultsReport { files }
    }

    /// Number of distinct files with at least one match
    pub fn files_with_matches(&self) -> usize {
        self.files.len()
    }

    /// Number of matching (file, line) pairs
    pub fn total_matches(&self) -> usize {
        self.files.iter().map(|f| f.matches.len()).sum()
    }

    /// One `<path>:<line>: <text>` line per match
    pub fn render(&self) -> String {
        self.files
            .iter()
            .flat_map(|f| &f.matches)
            .map(|m| format!("{}:{}: {}\n", m.path.display(), m.line_number, m.line))
            .collect()
    }
}

/// Files in which one worker found matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFiles {
    pub worker: WorkerId,
    pub files: Vec<PathBuf>,
}

/// Worker-to-files accounting for the log report.
///
/// Workers with more files come first; workers that found nothing come last.
/// Ties keep worker index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerLog {
    pub workers: Vec<WorkerFiles>,
}

impl WorkerLog {
    pub fn from_workers(workers: &[WorkerResult]) -> Self {
        let mut workers: Vec<WorkerFiles> = workers
            .iter()
            .map(|w| WorkerFiles {
                worker: w.worker,
                // Records arrive file by file, so consecutive dedup leaves distinct files
                files: w
                    .outcome
                    .records()
                    .iter()
                    .map(|r| r.path.clone())
                    .dedup()
                    .collect(),
            })
            .collect();

        workers.sort_by_key(|w| (w.files.is_empty(), Reverse(w.files.len()), w.worker));

        WorkerLog { workers }
    }

    /// One `<worker>:<file>,<file>,...` line per worker
    pub fn render(&self) -> String {
        self.workers
            .iter()
            .map(|w| {
                format!(
                    "{}:{}\n",
                    w.worker,
                    w.files.iter().map(|p| p.display()).join(",")
                )
            })
            .collect()
    }
}

/// Builds both report views from the same scan output side by side
pub fn build_reports(output: &ScanOutput) -> (ResultsReport, WorkerLog) {
    rayon::join(
        || ResultsReport::from_records(output.records()),
        || WorkerLog::from_workers(&output.workers),
    )
}

/// Creates or truncates `path` and writes `contents` to it
pub fn write_report(path: &Path, contents: &str) -> ScanResult<()> {
    debug!("Writing {} bytes to {}", contents.len(), path.display());

    let file = File::create(path).map_err(|e| ScanError::report_write(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| ScanError::report_write(path, e))
}
