//! Public entry point of the download core.
//!
//! [`DownloadService`] owns the supervisor (and through it the registry) and
//! hands out one [`DownloadSession`] per download:
//!
//! ```text
//!                  ┌──────────────────────────────┐
//!  start_download ─►        DownloadService        │
//!  cancel_download─►  ProcessSupervisor            │
//!  fetch_metadata ─►  Arc<DownloadRegistry>        │
//!                  └──────────────┬───────────────┘
//!                                 │ per download
//!                                 ▼
//!                  DownloadSession (events + ProgressAggregator)
//!                                 │
//!                                 ▼
//!           Started, Progress, Log, Completed | Failed | Cancelled
//! ```

mod session;

pub use session::{DownloadEvent, DownloadSession};

use tracing::debug;

use crate::error::{MetadataResult, SupervisorResult};
use crate::metadata::{self, MediaInfo};
use crate::progress::ProgressAggregator;
use crate::supervisor::{
    DownloadId, DownloadRequest, DownloadState, ProcessSupervisor, SupervisorConfig,
};

/// Download orchestration facade.
pub struct DownloadService {
    supervisor: ProcessSupervisor,
}

impl DownloadService {
    /// Create a new service from supervisor configuration.
    pub fn new(config: SupervisorConfig) -> Self {
        Self::with_supervisor(ProcessSupervisor::new(config))
    }

    /// Create a service around an existing supervisor.
    pub fn with_supervisor(supervisor: ProcessSupervisor) -> Self {
        Self { supervisor }
    }

    /// The underlying supervisor.
    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    /// Start a download.
    ///
    /// Must be called from within a tokio runtime. Launch failures arrive on
    /// the session as [`DownloadEvent::Failed`].
    ///
    /// # Errors
    ///
    /// Returns `DuplicateIdentifier` synchronously if `id` is already active.
    pub fn start_download(
        &self,
        id: DownloadId,
        request: DownloadRequest,
    ) -> SupervisorResult<DownloadSession> {
        self.start_download_expecting(id, request, 0)
    }

    /// Start a download with a known expected size.
    ///
    /// # Arguments
    ///
    /// * `id` - Caller-chosen identifier, unique among active downloads
    /// * `request` - What to download and where
    /// * `expected_bytes` - Seed for the total estimate; 0 if unknown
    pub fn start_download_expecting(
        &self,
        id: DownloadId,
        request: DownloadRequest,
        expected_bytes: u64,
    ) -> SupervisorResult<DownloadSession> {
        debug!(download = %id, expected_bytes, "Starting download session");
        let receiver = self.supervisor.start(id.clone(), request)?;
        let aggregator = ProgressAggregator::new().with_expected_total(expected_bytes);
        Ok(DownloadSession::new(id, receiver, aggregator))
    }

    /// Cancel a download. Returns false if nothing was active for `id`.
    pub fn cancel_download(&self, id: &DownloadId) -> bool {
        self.supervisor.cancel(id)
    }

    /// Fetch media information for `url`.
    pub async fn fetch_metadata(&self, url: &str) -> MetadataResult<MediaInfo> {
        metadata::fetch_metadata(&self.supervisor, url).await
    }

    /// Whether the yt-dlp executable can be found.
    pub fn check_executable(&self) -> bool {
        self.supervisor.check_executable()
    }

    /// Identifiers of all active downloads.
    pub fn active_downloads(&self) -> Vec<DownloadId> {
        self.supervisor.registry().active_ids()
    }

    /// Supervisor-side state of `id`.
    pub fn download_state(&self, id: &DownloadId) -> DownloadState {
        self.supervisor.registry().state(id)
    }
}

impl Default for DownloadService {
    fn default() -> Self {
        Self::new(SupervisorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_service_is_idle() {
        let service = DownloadService::default();
        assert!(service.active_downloads().is_empty());
        assert_eq!(
            service.download_state(&DownloadId::new("x")),
            DownloadState::Idle
        );
        assert!(!service.cancel_download(&DownloadId::new("x")));
    }
}
