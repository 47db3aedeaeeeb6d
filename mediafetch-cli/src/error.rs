//! CLI error type.

use std::fmt;

use mediafetch::error::{ConfigError, MetadataError, SupervisorError};

/// Exit code used when the user cancelled with Ctrl+C.
pub const EXIT_CANCELLED: i32 = 130;

/// Errors surfaced to the terminal.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, parsed or saved.
    Config(String),
    /// The download failed.
    Download(String),
    /// The metadata probe failed.
    Metadata(MetadataError),
    /// The supervisor rejected the request.
    Supervisor(SupervisorError),
    /// The yt-dlp executable could not be found.
    ExecutableMissing(String),
    /// The async runtime could not be created.
    Runtime(std::io::Error),
    /// The user cancelled the download.
    Cancelled,
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Cancelled => EXIT_CANCELLED,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Download(msg) => write!(f, "Download failed: {}", msg),
            CliError::Metadata(e) => write!(f, "Could not fetch media info: {}", e),
            CliError::Supervisor(e) => write!(f, "{}", e),
            CliError::ExecutableMissing(program) => write!(
                f,
                "yt-dlp not found ({}). Install it or set executable.path with \
                 'mediafetch config set executable.path <path>'",
                program
            ),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Cancelled => write!(f, "Download cancelled"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Metadata(e) => Some(e),
            CliError::Supervisor(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<MetadataError> for CliError {
    fn from(e: MetadataError) -> Self {
        CliError::Metadata(e)
    }
}

impl From<SupervisorError> for CliError {
    fn from(e: SupervisorError) -> Self {
        CliError::Supervisor(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediafetch::supervisor::DownloadId;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Cancelled.exit_code(), 130);
        assert_eq!(CliError::Download("boom".into()).exit_code(), 1);
    }

    #[test]
    fn test_supervisor_error_conversion() {
        let err: CliError = SupervisorError::DuplicateIdentifier(DownloadId::new("7")).into();
        assert_eq!(err.to_string(), "download '7' is already active");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: CliError = ConfigError::UnknownKey("a.b".into()).into();
        assert!(matches!(err, CliError::Config(ref msg) if msg.contains("a.b")));
    }
}
