use std::fmt;
use std::path::PathBuf;

/// Index of a worker within one scan, assigned when partitions are built
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single line containing the search string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Worker that produced the record
    pub worker: WorkerId,
    /// File the line was read from
    pub path: PathBuf,
    /// 1-based line number
    pub line_number: usize,
    /// The full line, without its line terminator
    pub line: String,
}

/// Where reading a skipped file went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipStage {
    /// The file could not be opened; it contributed nothing
    Open,
    /// The file opened but a later read failed; matches before the failure are kept
    Read,
}

/// A file a worker could not read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub stage: SkipStage,
    pub reason: String,
}

impl fmt::Display for SkippedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.stage {
            SkipStage::Open => "open",
            SkipStage::Read => "read",
        };
        write!(
            f,
            "could not {} file {}: {}",
            action,
            self.path.display(),
            self.reason
        )
    }
}

/// What a worker found across its whole partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// At least one match, in file-then-line order
    Matches(Vec<MatchRecord>),
    /// The partition was scanned (or was empty) and nothing matched
    NoMatches,
}

impl WorkerOutcome {
    /// Wraps scanner output, turning an empty list into [`WorkerOutcome::NoMatches`]
    pub fn from_records(records: Vec<MatchRecord>) -> Self {
        if records.is_empty() {
            WorkerOutcome::NoMatches
        } else {
            WorkerOutcome::Matches(records)
        }
    }

    pub fn records(&self) -> &[MatchRecord] {
        match self {
            WorkerOutcome::Matches(records) => records,
            WorkerOutcome::NoMatches => &[],
        }
    }
}

/// Everything one worker returns to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerResult {
    pub worker: WorkerId,
    pub outcome: WorkerOutcome,
    /// Files of the partition that could not be opened or read
    pub skipped: Vec<SkippedFile>,
}

/// Joined output of all workers of one scan
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    /// Per-worker results, in worker index order
    pub workers: Vec<WorkerResult>,
    /// Number of files enumerated, including ones that were skipped
    pub files_searched: usize,
}

impl ScanOutput {
    /// Creates a new empty scan output
    pub fn new() -> Self {
        Default::default()
    }

    /// All match records in worker, then file, then line order
    pub fn records(&self) -> impl Iterator<Item = &MatchRecord> {
        self.workers.iter().flat_map(|w| w.outcome.records())
    }

    /// All skipped files in worker order
    pub fn skipped(&self) -> impl Iterator<Item = &SkippedFile> {
        self.workers.iter().flat_map(|w| w.skipped.iter())
    }
}
