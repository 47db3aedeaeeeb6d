//! Download command - fetch one URL with a live progress bar.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use mediafetch::metadata::FormatSelection;
use mediafetch::service::DownloadEvent;
use mediafetch::supervisor::{DownloadId, DownloadRequest};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::display::DownloadProgress;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the download command.
pub struct DownloadArgs {
    pub url: String,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub id: Option<String>,
    pub show_output: bool,
}

/// Run the download command.
pub fn run(args: DownloadArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("download");
    runner.require_executable()?;

    let config = runner.config();
    let template = args
        .output
        .map(|path| path.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.downloads.output_path_template());
    let format = args.format.or_else(|| config.downloads.format.clone());
    let id = DownloadId::new(args.id.unwrap_or_else(generate_id));

    let shutdown = CancellationToken::new();
    let handler_token = shutdown.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    runner.block_on(download(runner, args.url, template, format, id, args.show_output, shutdown))
}

async fn download(
    runner: &CliRunner,
    url: String,
    template: String,
    format: Option<String>,
    id: DownloadId,
    show_output: bool,
    shutdown: CancellationToken,
) -> Result<(), CliError> {
    let service = runner.service();

    let mut request = DownloadRequest::new(url.clone(), template);
    let mut expected_bytes = 0;
    if let Some(format) = format {
        let selection = resolve_selection(runner, &url, &format).await;
        if selection.merges_audio {
            println!("Video-only format selected, merging with best audio");
        }
        expected_bytes = selection.expected_bytes;
        request = request.with_format(selection.selector);
    }

    let mut session = service.start_download_expecting(id.clone(), request, expected_bytes)?;
    let display = DownloadProgress::new(&url);
    let mut cancel_requested = false;

    loop {
        let event = tokio::select! {
            event = session.next_event() => event,
            () = shutdown.cancelled(), if !cancel_requested => {
                cancel_requested = true;
                service.cancel_download(&id);
                continue;
            }
        };

        match event {
            Some(DownloadEvent::Started) => display.started(),
            Some(DownloadEvent::Progress(snapshot)) => display.update(&snapshot),
            Some(DownloadEvent::Log(line)) => {
                debug!(target: "yt-dlp", "{}", line);
                if show_output {
                    display.println(&line);
                }
            }
            Some(DownloadEvent::Completed { path, progress }) => {
                display.completed(&progress, &path);
                return Ok(());
            }
            Some(DownloadEvent::Failed { message, .. }) => {
                display.failed(&message);
                return Err(CliError::Download(message));
            }
            Some(DownloadEvent::Cancelled) => {
                display.cancelled();
                return Err(CliError::Cancelled);
            }
            None => {
                let message = "yt-dlp stopped without reporting an outcome".to_string();
                display.failed(&message);
                return Err(CliError::Download(message));
            }
        }
    }
}

/// Resolve a format against the media's format list.
///
/// Plain format ids are looked up so that video-only formats get audio
/// merged in. Selector expressions, or a failed lookup, pass through as is.
async fn resolve_selection(runner: &CliRunner, url: &str, format: &str) -> FormatSelection {
    let raw = FormatSelection {
        selector: format.to_string(),
        expected_bytes: 0,
        merges_audio: false,
    };
    if !is_plain_format_id(format) {
        return raw;
    }

    match runner.service().fetch_metadata(url).await {
        Ok(info) => FormatSelection::from_info(&info, format),
        Err(e) => {
            warn!(error = %e, "Could not look up formats, using selector as given");
            raw
        }
    }
}

/// Whether `format` is a single format id rather than a selector expression.
pub fn is_plain_format_id(format: &str) -> bool {
    !format.is_empty()
        && format
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Millisecond timestamp used when no id is given.
fn generate_id() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_format_ids() {
        assert!(is_plain_format_id("137"));
        assert!(is_plain_format_id("hls-1080p"));
        assert!(is_plain_format_id("dash_video_1"));
    }

    #[test]
    fn test_selector_expressions_are_not_plain() {
        assert!(!is_plain_format_id("137+140"));
        assert!(!is_plain_format_id("bestvideo[height<=720]"));
        assert!(!is_plain_format_id("best/worst"));
        assert!(!is_plain_format_id(""));
    }

    #[test]
    fn test_generated_id_is_numeric() {
        let id = generate_id();
        assert!(!id.is_empty());
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }
}
