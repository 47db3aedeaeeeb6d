//! Information-only yt-dlp runs.

use tracing::{debug, info, warn};

use super::info::MediaInfo;
use crate::error::{MetadataError, MetadataResult};
use crate::supervisor::{build_metadata_args, ProcessSupervisor};

/// Run `yt-dlp -J --flat-playlist --no-playlist <url>` and decode the result.
///
/// Nothing is registered; the probe is independent of active downloads.
/// There is no timeout, so a slow extractor makes this wait as long as
/// yt-dlp does.
///
/// # Errors
///
/// * [`MetadataError::Spawn`] if the executable cannot be launched
/// * [`MetadataError::ExitStatus`] on a non-zero exit, with stderr
/// * [`MetadataError::InvalidJson`] if stdout is not a valid info document
pub async fn fetch_metadata(supervisor: &ProcessSupervisor, url: &str) -> MetadataResult<MediaInfo> {
    let args = build_metadata_args(url);
    debug!(url, args = ?args, "Fetching metadata");

    let output = supervisor
        .command(&args)
        .output()
        .await
        .map_err(|source| MetadataError::Spawn {
            program: supervisor.executable().program.clone(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(url, code = ?output.status.code(), "Metadata probe failed");
        return Err(MetadataError::ExitStatus {
            code: output.status.code(),
            stderr,
        });
    }

    let info: MediaInfo = serde_json::from_slice(&output.stdout)?;
    info!(id = %info.id, formats = info.formats.len(), "Fetched metadata");
    Ok(info)
}
