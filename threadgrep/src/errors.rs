/// Error types for threadgrep.
///
/// Only conditions that stop a whole scan live here. A file that cannot be
/// opened while a worker is scanning its partition is not an error at this
/// level: the worker records it as a [`SkippedFile`](crate::results::SkippedFile)
/// and moves on to the next file.
///
/// ```rust,ignore
/// match search(&config) {
///     Ok(output) => // aggregate and write reports,
///     Err(ScanError::DirectoryNotFound(path)) => // report missing root,
///     Err(e) => // any other fatal condition
/// }
/// ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that abort a scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("Invalid thread count: {0}")]
    InvalidThreadCount(String),
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),
    #[error("Usage error: {0}")]
    Usage(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Could not write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScanError {
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound(path.into())
    }

    pub fn invalid_thread_count(value: impl Into<String>) -> Self {
        Self::InvalidThreadCount(value.into())
    }

    pub fn invalid_file_name(name: impl Into<String>) -> Self {
        Self::InvalidFileName(name.into())
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn report_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReportWrite {
            path: path.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for ScanError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for ScanError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}
