//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional NDJSON file rotation,
//! and environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global structured logger.
///
/// `RUST_LOG` wins over `level`. When `log_dir` is set, JSON lines are also
/// written to `platelog.log.YYYY-MM-DD` in that directory. Calling this twice
/// is harmless; the second call is ignored. If the log directory cannot be
/// used, logging continues on the console and the failure is logged.
pub fn init_logger(level: &str, log_dir: Option<&Path>, json_console: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_appender, file_error) = match log_dir.map(daily_file_appender) {
        Some(Ok(appender)) => (Some(appender), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let file_layer = file_appender.map(|appender| {
        fmt::layer()
            .json()
            .with_writer(appender)
            .with_ansi(false)
    });

    let (json_layer, text_layer) = if json_console {
        (Some(fmt::layer().json().with_writer(std::io::stderr)), None)
    } else {
        (
            None,
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(true),
            ),
        )
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init();

    if let (Some(e), Some(dir)) = (file_error, log_dir) {
        tracing::error!(dir = %dir.display(), error = %e, "Log file disabled");
    }
}

/// Daily-rolling `platelog.log` appender in `dir`, creating the directory.
fn daily_file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("platelog.log")
        .build(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appender_creates_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("logs");
        assert!(daily_file_appender(&dir).is_ok());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_appender_reports_unusable_dir() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        assert!(daily_file_appender(&file).is_err());
    }

    #[test]
    fn test_init_logger_survives_unusable_dir() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        init_logger("info", Some(&file), false);
    }
}
