//! Logging setup for the idgen binary.
//!
//! Two layers share one `EnvFilter` source (`RUST_LOG`, default `idgen=info`):
//! a daily rolling file under `$IDGEN_HOME/logs` and a stderr console.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "idgen=info,idgen_ids=info,idgen_sinks=info";
const VERBOSE_LOG_FILTER: &str = "idgen=debug,idgen_ids=debug,idgen_sinks=debug";
const MAX_LOG_FILES: usize = 5;

pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Send debug output to the console as well
    pub verbose: bool,
}

/// Install the global subscriber.
///
/// When the log directory cannot be prepared the file layer is skipped and
/// a warning is printed; console logging still comes up.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let appender = ensure_logs_dir().and_then(|dir| file_appender(&dir, config.app_name));
    let file_layer = match appender {
        Ok(writer) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter),
        ),
        Err(err) => {
            eprintln!("Warning: file logging disabled: {:#}", err);
            None
        }
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Logs directory: ~/.idgen/logs
pub fn logs_dir() -> PathBuf {
    idgen_protocol::default_logs_dir()
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Daily-rotated `<app>.<date>.log` under `dir`, keeping the newest files.
fn file_appender(dir: &Path, app_name: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(app_name)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .with_context(|| format!("Failed to open log file for {}", app_name))
}
