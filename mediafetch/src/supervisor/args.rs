//! Argument vectors for yt-dlp invocations.

use std::ffi::OsString;
use std::path::Path;

use super::request::DownloadRequest;

/// Flags every download starts with, in order.
///
/// * `--newline` - one progress line per update instead of carriage returns
/// * `--no-playlist` - a playlist URL downloads only the referenced item
/// * `--no-warnings` - keep interactive diagnostics out of the output
/// * `--force-overwrites` - replace existing destination files
pub const DOWNLOAD_FLAGS: [&str; 4] = [
    "--newline",
    "--no-playlist",
    "--no-warnings",
    "--force-overwrites",
];

/// Flags for an information-only run that prints one JSON document.
pub const METADATA_FLAGS: [&str; 3] = ["-J", "--flat-playlist", "--no-playlist"];

/// Ends option parsing; everything after it is positional.
pub const URL_SEPARATOR: &str = "--";

/// Build the argument vector for a download.
///
/// Order: fixed flags, optional `--ffmpeg-location`, optional `-f`, then
/// `-o <template>` and finally `--` and the URL, so a URL starting with `-`
/// is never read as an option.
pub fn build_download_args(
    request: &DownloadRequest,
    ffmpeg_location: Option<&Path>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = DOWNLOAD_FLAGS.iter().map(OsString::from).collect();

    if let Some(location) = ffmpeg_location {
        args.push("--ffmpeg-location".into());
        args.push(location.as_os_str().to_owned());
    }

    if let Some(format) = request.format.as_deref().filter(|f| !f.trim().is_empty()) {
        args.push("-f".into());
        args.push(format.into());
    }

    args.push("-o".into());
    args.push(request.output_template.as_str().into());
    args.push(URL_SEPARATOR.into());
    args.push(request.url.as_str().into());
    args
}

/// Build the argument vector for a metadata probe.
pub fn build_metadata_args(url: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = METADATA_FLAGS.iter().map(OsString::from).collect();
    args.push(URL_SEPARATOR.into());
    args.push(url.into());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_args_minimal() {
        let request = DownloadRequest::new("https://example.com/watch?v=1", "/out/%(title)s.%(ext)s");
        let args = build_download_args(&request, None);

        assert_eq!(
            args,
            vec![
                "--newline",
                "--no-playlist",
                "--no-warnings",
                "--force-overwrites",
                "-o",
                "/out/%(title)s.%(ext)s",
                "--",
                "https://example.com/watch?v=1",
            ]
        );
    }

    #[test]
    fn test_download_args_with_format_and_ffmpeg() {
        let request = DownloadRequest::new("https://example.com/v", "out.%(ext)s")
            .with_format("137+bestaudio");
        let args = build_download_args(&request, Some(Path::new("/usr/local/bin/ffmpeg")));

        assert_eq!(
            args,
            vec![
                "--newline",
                "--no-playlist",
                "--no-warnings",
                "--force-overwrites",
                "--ffmpeg-location",
                "/usr/local/bin/ffmpeg",
                "-f",
                "137+bestaudio",
                "-o",
                "out.%(ext)s",
                "--",
                "https://example.com/v",
            ]
        );
    }

    #[test]
    fn test_dash_url_follows_separator() {
        let request = DownloadRequest {
            url: "-weird-url".to_string(),
            format: Some("best".to_string()),
            output_template: "t".to_string(),
        };
        let args = build_download_args(&request, None);
        let n = args.len();
        assert_eq!(args[n - 2], "--");
        assert_eq!(args[n - 1], "-weird-url");
    }

    #[test]
    fn test_blank_format_field_is_skipped() {
        let request = DownloadRequest {
            url: "u".to_string(),
            format: Some(String::new()),
            output_template: "t".to_string(),
        };
        let args = build_download_args(&request, None);
        assert!(!args.iter().any(|a| a == "-f"));
    }

    #[test]
    fn test_metadata_args() {
        assert_eq!(
            build_metadata_args("https://example.com/v"),
            vec!["-J", "--flat-playlist", "--no-playlist", "--", "https://example.com/v"]
        );
    }
}
