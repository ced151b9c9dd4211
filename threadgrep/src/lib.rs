pub mod config;
pub mod errors;
pub mod report;
pub mod results;
pub mod search;
pub mod summary;

pub use config::{ScanConfig, Settings};
pub use errors::{ScanError, ScanResult};
pub use report::{build_reports, write_report, ResultsReport, WorkerLog};
pub use results::{
    MatchRecord, ScanOutput, SkipStage, SkippedFile, WorkerId, WorkerOutcome, WorkerResult,
};
pub use search::search;
pub use summary::ScanSummary;
