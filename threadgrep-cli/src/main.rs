use clap::error::ErrorKind;
use clap::Parser;
use colored::Colorize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use threadgrep::{
    build_reports,
    config::{resolve_root, Settings},
    search, write_report, ScanError, ScanOutput, ScanSummary,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, ScanError>;

/// Program name plus the search string plus four option pairs
const MAX_ARGS: usize = 10;

const LOG_ENV_VAR: &str = "THREADGREP_LOG";

#[derive(Parser, Debug)]
#[command(name = "threadgrep", author, version, about, long_about = None)]
struct Cli {
    /// Literal, case-sensitive text to search for (may start with '-')
    #[arg(allow_hyphen_values = true)]
    search_string: String,

    /// Directory to search in (default: current directory)
    #[arg(short = 'd', long = "dir", allow_hyphen_values = true)]
    dir: Option<PathBuf>,

    /// Base name of the worker log file, written as <name>.log
    #[arg(short = 'l', long = "log_file", allow_hyphen_values = true)]
    log_file: Option<String>,

    /// Base name of the results file, written as <name>.txt
    #[arg(short = 'r', long = "result_file", allow_hyphen_values = true)]
    result_file: Option<String>,

    /// Number of worker threads
    #[arg(short = 't', long = "threads", allow_hyphen_values = true)]
    threads: Option<String>,
}

fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let code = match run(std::env::args_os().collect()) {
        Ok(code) => code,
        Err(e) => {
            print_error(&e.to_string());
            1
        }
    };
    std::process::exit(code);
}

fn run(args: Vec<OsString>) -> Result<i32> {
    check_arg_count(&args)?;

    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(0);
        }
        Err(e) => return Err(ScanError::usage(first_line(&e.to_string()))),
    };

    let default_name = program_name(&args);
    let cwd = std::env::current_dir()?;
    let root = match &cli.dir {
        Some(dir) => resolve_root(&cwd, dir)?,
        None => cwd,
    };

    let cli_settings = Settings {
        threads: cli.threads,
        result_file: cli.result_file,
        log_file: cli.log_file,
        log_level: None,
    };
    let config = Settings::load()?
        .merge_with_cli(cli_settings)
        .into_scan_config(cli.search_string, root, default_name)?;

    init_logging(&config.log_level);
    debug!("Resolved configuration: {:?}", config);

    let start = Instant::now();
    let output = search(&config)?;
    report_skipped(&output);

    let (results, workers) = build_reports(&output);
    let mut failed = false;
    for (path, contents) in [
        (config.result_path(), results.render()),
        (config.log_path(), workers.render()),
    ] {
        if let Err(e) = write_report(&path, &contents) {
            print_error(&e.to_string());
            failed = true;
        }
    }
    let elapsed = start.elapsed();

    print_summary(&ScanSummary::new(&config, &output, &results, elapsed));
    Ok(if failed { 1 } else { 0 })
}

/// The search string plus flag/value pairs always make an odd token count
fn check_arg_count(args: &[OsString]) -> Result<()> {
    let tokens = args.len().saturating_sub(1);
    if args.len() > MAX_ARGS {
        return Err(ScanError::usage(format!(
            "too many arguments ({}), at most {} allowed",
            tokens,
            MAX_ARGS - 1
        )));
    }
    if tokens % 2 == 0 {
        return Err(ScanError::usage(
            "expected <search string> followed by option/value pairs",
        ));
    }
    Ok(())
}

/// Base name of the executable, used when no report names are given
fn program_name(args: &[OsString]) -> String {
    args.first()
        .and_then(|arg| Path::new(arg).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "threadgrep".to_string())
}

fn first_line(message: &str) -> String {
    let line = message.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level));
    // Ignore a second initialisation attempt
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn report_skipped(output: &ScanOutput) {
    for skipped in output.skipped() {
        print_error(&skipped.to_string());
    }
}

fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

fn print_summary(summary: &ScanSummary) {
    for (label, value) in summary.lines() {
        println!("{}: {}", label.bold(), value);
    }
}
