// ============================================================================
// qs02-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger and log4rs Initialization
//
// The qs02 binary logs through the standard `log` facade. Console-only runs
// use `env_logger`; with --log-dir, log4rs writes to stderr and to the file.
//
// USAGE:
// - RUST_LOG=info (default): per-file milestones
// - RUST_LOG=debug or --verbose: every engine decision
// - --log-dir DIR: a copy of every line goes to DIR/qs02_<timestamp>.log

// ---- External crate imports ----
use anyhow::{Context, Result};
use env_logger::{Builder, Env};
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

// ---- Standard library imports ----
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const CONSOLE_PATTERN: &str = "{d(%H:%M:%S)} {l:<5} [{t}] {m}{n}";
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] [{t}] {m}{n}";

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// `--verbose` wins, then a plain level in RUST_LOG, then info.
fn file_log_level(verbose: bool) -> LevelFilter {
    if verbose {
        return LevelFilter::Debug;
    }
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Builds a log4rs config that writes to stderr and to `log_file`.
fn file_logging_config(log_file: &Path, level: LevelFilter) -> Result<Config> {
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(console)))
        .appender(Appender::builder().build("file", Box::new(file)))
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(level),
        )?;
    Ok(config)
}

/// Initializes logging. Returns the log file path when `log_dir` is set.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(dir) = log_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let path = dir.join(format!("qs02_{}.log", get_timestamp()));
        let config = file_logging_config(&path, file_log_level(verbose))?;
        log4rs::init_config(config).context("Failed to initialize file logging")?;
        return Ok(Some(path));
    }

    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} [{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    // A second initialization (tests) keeps the first logger.
    let _ = builder.try_init();
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let ts = get_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'_');
    }

    #[test]
    fn test_file_logging_config_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qs02_test.log");

        let config = file_logging_config(&path, LevelFilter::Debug).unwrap();
        assert!(path.is_file());
        assert_eq!(config.root().level(), LevelFilter::Debug);
        assert_eq!(
            config.root().appenders().to_vec(),
            vec!["stderr".to_string(), "file".to_string()]
        );
    }

    #[test]
    fn test_verbose_forces_debug_file_level() {
        assert_eq!(file_log_level(true), LevelFilter::Debug);
    }
}
