use config::{Config as ConfigBuilder, File};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{ScanError, ScanResult};

/// Worker count used when neither the command line nor a settings file names one
pub const DEFAULT_THREAD_COUNT: usize = 4;

/// Extension appended to the results report name
pub const RESULT_EXTENSION: &str = "txt";

/// Extension appended to the worker log report name
pub const LOG_EXTENSION: &str = "log";

/// Name of the settings file looked up in the working directory
pub const LOCAL_SETTINGS_FILE: &str = ".threadgrep.yaml";

static FILE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-. ]+$").expect("file name pattern is valid"));

/// Configuration for a single scan.
///
/// Built by the CLI from its arguments merged over [`Settings`] read from
/// disk. Every value in here has already been validated.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Literal, case-sensitive text to look for
    pub search_string: String,

    /// Directory whose tree is scanned
    pub root_path: PathBuf,

    /// Number of workers (and partitions)
    pub thread_count: NonZeroUsize,

    /// Base name of the results report, without extension
    pub result_name: String,

    /// Base name of the worker log report, without extension
    pub log_name: String,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl ScanConfig {
    /// Creates a configuration with default worker count, using `default_name`
    /// for both reports
    pub fn new(
        search_string: impl Into<String>,
        root_path: impl Into<PathBuf>,
        default_name: impl Into<String>,
    ) -> Self {
        let default_name = default_name.into();
        ScanConfig {
            search_string: search_string.into(),
            root_path: root_path.into(),
            thread_count: default_thread_count(),
            result_name: default_name.clone(),
            log_name: default_name,
            log_level: default_log_level(),
        }
    }

    /// Builder method to set the number of workers
    pub fn with_thread_count(mut self, count: NonZeroUsize) -> Self {
        self.thread_count = count;
        self
    }

    /// Builder method to set the results report name
    pub fn with_result_name(mut self, name: impl Into<String>) -> Self {
        self.result_name = name.into();
        self
    }

    /// Builder method to set the worker log report name
    pub fn with_log_name(mut self, name: impl Into<String>) -> Self {
        self.log_name = name.into();
        self
    }

    /// Builder method to set the log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Path of the results report, relative to the working directory
    pub fn result_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.result_name, RESULT_EXTENSION))
    }

    /// Path of the worker log report, relative to the working directory
    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.log_name, LOG_EXTENSION))
    }
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_THREAD_COUNT).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Optional scan settings, read from YAML files or taken from the command line.
///
/// Settings files are looked up in order of increasing precedence:
/// 1. Global `$HOME/.config/threadgrep/config.yaml`
/// 2. Local `.threadgrep.yaml` in the working directory
/// 3. An explicit path passed to [`Settings::load_from`]
///
/// ```yaml
/// threads: 8
/// result_file: "matches"
/// log_file: "workers"
/// log_level: "info"
/// ```
///
/// Values are kept as raw strings until [`Settings::into_scan_config`] so that
/// a bad value from a file is rejected exactly like the same value on the
/// command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub threads: Option<String>,
    pub result_file: Option<String>,
    pub log_file: Option<String>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Loads settings from the default locations
    pub fn load() -> ScanResult<Self> {
        Self::load_from(None)
    }

    /// Loads settings from the default locations plus a specific file
    pub fn load_from(settings_path: Option<&Path>) -> ScanResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let global = dirs::config_dir().map(|p| p.join("threadgrep/config.yaml"));
        for path in [global, Some(PathBuf::from(LOCAL_SETTINGS_FILE))]
            .iter()
            .flatten()
        {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = settings_path {
            builder = builder.add_source(File::from(path));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges command line values over file values
    pub fn merge_with_cli(self, cli: Settings) -> Self {
        Settings {
            threads: cli.threads.or(self.threads),
            result_file: cli.result_file.or(self.result_file),
            log_file: cli.log_file.or(self.log_file),
            log_level: cli.log_level.or(self.log_level),
        }
    }

    /// Validates the settings and produces the configuration for one scan.
    ///
    /// `default_name` names both reports when no explicit name was given and is
    /// not subject to file name validation.
    pub fn into_scan_config(
        self,
        search_string: impl Into<String>,
        root_path: impl Into<PathBuf>,
        default_name: impl Into<String>,
    ) -> ScanResult<ScanConfig> {
        let mut config = ScanConfig::new(search_string, root_path, default_name);

        if let Some(threads) = self.threads {
            config = config.with_thread_count(parse_thread_count(&threads)?);
        }
        if let Some(name) = self.result_file {
            validate_file_name(&name)?;
            config = config.with_result_name(name);
        }
        if let Some(name) = self.log_file {
            validate_file_name(&name)?;
            config = config.with_log_name(name);
        }
        if let Some(level) = self.log_level {
            config = config.with_log_level(level);
        }

        Ok(config)
    }
}

/// Parses a worker count; anything that is not an integer above zero is rejected
pub fn parse_thread_count(value: &str) -> ScanResult<NonZeroUsize> {
    let count: i64 = value
        .parse()
        .map_err(|_| ScanError::invalid_thread_count(value))?;
    usize::try_from(count)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| ScanError::invalid_thread_count(value))
}

/// Accepts report names made only of letters, digits, `_`, `-`, `.` and spaces
pub fn validate_file_name(name: &str) -> ScanResult<()> {
    if FILE_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(ScanError::invalid_file_name(name))
    }
}

/// Resolves the scan root, preferring `cwd/dir` over `dir` as given
pub fn resolve_root(cwd: &Path, dir: &Path) -> ScanResult<PathBuf> {
    let joined = cwd.join(dir);
    if joined.is_dir() {
        return Ok(joined);
    }
    if dir.is_dir() {
        return Ok(dir.to_path_buf());
    }
    Err(ScanError::directory_not_found(dir))
}
