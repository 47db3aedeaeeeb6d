//! Tracing subscriber setup.
//!
//! Installs a registry with an `EnvFilter` (`RUST_LOG` wins over the
//! configured level), a stderr formatter, and optionally a daily-rolling log
//! file written through a non-blocking appender.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DEFAULT_LOG_LEVEL;

/// Prefix of rolling log file names.
pub const LOG_FILE_PREFIX: &str = "mediafetch.log";

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Directory for daily log files; `None` logs to stderr only.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

impl LoggingConfig {
    /// Replace the level, e.g. from a `--verbose` flag.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

/// Keeps the file writer flushing. Hold it until the program exits.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Build the filter: `RUST_LOG` if set and valid, else the configured level,
/// else `info`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber.
///
/// Calling this twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_logging(config: &LoggingConfig) -> LoggingGuard {
    let filter = build_filter(&config.level);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    LoggingGuard { _file: guard }
}
