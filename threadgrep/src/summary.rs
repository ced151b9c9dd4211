use std::path::PathBuf;
use std::time::Duration;

use crate::config::ScanConfig;
use crate::report::ResultsReport;
use crate::results::ScanOutput;

/// Figures shown on the console once a scan has finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub files_searched: usize,
    pub files_with_matches: usize,
    pub total_matches: usize,
    pub result_file: PathBuf,
    pub log_file: PathBuf,
    pub threads: usize,
    pub elapsed: Duration,
}

impl ScanSummary {
    /// `elapsed` is measured by the caller around dispatch and report writing
    pub fn new(
        config: &ScanConfig,
        output: &ScanOutput,
        report: &ResultsReport,
        elapsed: Duration,
    ) -> Self {
        Self {
            files_searched: output.files_searched,
            files_with_matches: report.files_with_matches(),
            total_matches: report.total_matches(),
            result_file: config.result_path(),
            log_file: config.log_path(),
            threads: config.thread_count.get(),
            elapsed,
        }
    }

    /// Label and value pairs in display order
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Searched files", self.files_searched.to_string()),
            ("Files with pattern", self.files_with_matches.to_string()),
            ("Patterns number", self.total_matches.to_string()),
            ("Result file", self.result_file.display().to_string()),
            ("Log file", self.log_file.display().to_string()),
            ("Used threads", self.threads.to_string()),
            ("Elapsed time", format!("{}[ms]", self.elapsed.as_millis())),
        ]
    }
}
