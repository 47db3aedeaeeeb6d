//! Shared setup for commands that talk to yt-dlp.

use std::future::Future;
use std::path::Path;

use mediafetch::config::ConfigFile;
use mediafetch::logging::{init_logging, LoggingGuard};
use mediafetch::service::DownloadService;
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Loaded configuration, installed logging, and an async runtime.
pub struct CliRunner {
    config: ConfigFile,
    service: DownloadService,
    runtime: Runtime,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Create a new runner.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file override; the default location when `None`
    /// * `verbose` - Log at debug level, including raw yt-dlp output
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let config = load_config(config_path)?;

        let mut logging = config.logging_config();
        if verbose {
            logging = logging.with_level("debug");
        }
        let guard = init_logging(&logging);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        let service = DownloadService::new(config.supervisor_config());

        Ok(Self {
            config,
            service,
            runtime,
            _logging: guard,
        })
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(version = mediafetch::VERSION, command, "mediafetch starting");
    }

    /// The loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// The download service.
    pub fn service(&self) -> &DownloadService {
        &self.service
    }

    /// Run a future to completion on the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Fail early when the executable cannot be found.
    pub fn require_executable(&self) -> Result<(), CliError> {
        if self.service.check_executable() {
            Ok(())
        } else {
            let program = self.service.supervisor().executable().program.clone();
            Err(CliError::ExecutableMissing(program.display().to_string()))
        }
    }
}

/// Load the configuration from `path`, or from the default location.
///
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    match path {
        Some(path) if path.exists() => Ok(ConfigFile::load_from(path)?),
        Some(_) => Ok(ConfigFile::default()),
        None => Ok(ConfigFile::load()?),
    }
}
