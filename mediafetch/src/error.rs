//! Error types for the download orchestration core.
//!
//! Parse anomalies in the external tool's output are never errors; they are
//! relayed as log lines. Only failures that end a download's lifecycle (or
//! prevent it from starting) surface through these types.

use std::path::PathBuf;

use thiserror::Error;

use crate::supervisor::DownloadId;

/// Result type for supervisor operations.
pub type SupervisorResult<T> = Result<T, SupervisorError>;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised synchronously by the process supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A download with this identifier is already spawning or running.
    #[error("download '{0}' is already active")]
    DuplicateIdentifier(DownloadId),

    /// The supervisor was asked to spawn outside a Tokio runtime.
    #[error("no Tokio runtime available to supervise download '{0}'")]
    NoRuntime(DownloadId),
}

/// Errors from the information-only metadata probe.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The executable could not be launched.
    #[error("failed to launch {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The executable ran but exited unsuccessfully.
    #[error("yt-dlp exited with {}: {stderr}", describe_exit(.code))]
    ExitStatus { code: Option<i32>, stderr: String },

    /// The info response was not valid JSON.
    #[error("failed to parse yt-dlp JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Errors loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    /// The configuration file could not be written.
    #[error("failed to write config {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested key does not exist.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    /// A value could not be interpreted for its key.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// No platform configuration directory could be determined.
    #[error("could not determine the configuration directory")]
    NoConfigDir,
}

/// Human-readable exit description ("code 1" or "a signal").
pub(crate) fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}
