//! Logging setup: stdout plus a daily-rotated file under the log directory.

use std::path::Path;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "odinbot";
const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 7;

#[derive(Error, Debug)]
pub enum LogInitError {
    #[error("Failed to parse log filter: {0}")]
    FilterError(String),

    #[error("Failed to create log file appender: {0}")]
    AppenderError(String),

    #[error("Failed to set global subscriber: {0}")]
    SetGlobalError(String),
}

/// Install the global subscriber. Keep the returned guard alive until exit or
/// buffered file output is lost.
pub fn init(log_dir: &Path) -> Result<WorkerGuard, LogInitError> {
    let filter = build_env_filter("info")?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .map_err(|e| LogInitError::AppenderError(e.to_string()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LogInitError::SetGlobalError(e.to_string()))?;

    Ok(guard)
}

fn build_env_filter(default: &str) -> Result<EnvFilter, LogInitError> {
    // RUST_LOG wins when set
    let filter_str = std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_string());
    EnvFilter::try_new(&filter_str).map_err(|e| LogInitError::FilterError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_builds() {
        assert!(build_env_filter("info").is_ok());
        assert!(build_env_filter("odinbot=debug,serenity=warn").is_ok());
    }

    #[test]
    fn test_appender_error_message() {
        let err = LogInitError::AppenderError("denied".to_string());
        assert_eq!(err.to_string(), "Failed to create log file appender: denied");
    }
}
