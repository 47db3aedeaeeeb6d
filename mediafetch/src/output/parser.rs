//! Text adapter for yt-dlp's human-readable `--newline` output.
//!
//! Lines are matched in priority order:
//!
//! 1. `[download]  45.2% of ~10.00MiB at 1.50MiB/s ETA 00:07` - progress
//! 2. `[Merger] ...`, `[Fixup...] ...`, `[ffmpeg] ...` and other
//!    post-processor banners - phase transition
//! 3. `[download] Destination: P`, `[download] P has already been
//!    downloaded` - destination announcement
//! 4. anything else - unclassified
//!
//! The regexes are compiled once and shared.

use regex::Regex;
use std::sync::OnceLock;

use super::types::{Destination, DestinationKind, LineEvent, Phase, RawProgressSample};
use crate::units;

/// Converts one line of raw process output into a [`LineEvent`].
///
/// The supervisor only talks to this trait, so the text adapter can be
/// swapped for a structured progress protocol without touching the rest of
/// the pipeline.
pub trait OutputParser: Send + Sync {
    /// Classify a single line (without its trailing newline).
    fn classify(&self, line: &str) -> LineEvent;
}

/// Parser for yt-dlp's default progress template.
#[derive(Debug, Default, Clone, Copy)]
pub struct YtDlpTextParser;

impl YtDlpTextParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }
}

impl OutputParser for YtDlpTextParser {
    fn classify(&self, line: &str) -> LineEvent {
        classify(line)
    }
}

/// Post-processor banners that mean the transfer phase is over.
///
/// `[Fixup` is a prefix match so `[FixupM3u8]`, `[FixupM4a]` etc. all count.
const PHASE_PREFIXES: &[&str] = &[
    "[Merger]",
    "[Fixup",
    "[ffmpeg]",
    "[ExtractAudio]",
    "[VideoRemuxer]",
    "[VideoConvertor]",
    "[EmbedThumbnail]",
    "[EmbedSubtitle]",
];

const DOWNLOAD_DESTINATION: &str = "[download] Destination: ";
const POSTPROCESS_DESTINATION: &str = "] Destination: ";

fn progress_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Group 1: percent, group 2: total magnitude, group 3: total unit.
        // The total may be approximate ("~10.00MiB" or "~ 10.00MiB").
        Regex::new(r"\[download\]\s+(\d+(?:\.\d+)?)%\s+of\s+~?\s*(\d+(?:\.\d+)?)\s*([KMGTP]?i?B)")
            .unwrap()
    })
}

fn rate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bat\s+~?\s*(\d+(?:\.\d+)?)\s*([KMGTP]?i?B)/s").unwrap())
}

fn eta_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bETA\s+(\d+:\d{2}(?::\d{2})?)").unwrap())
}

fn merge_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"Merging formats into "(.*)""#).unwrap())
}

fn already_downloaded_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[download\] (.*) has already been downloaded").unwrap())
}

/// Classify one line of yt-dlp output.
///
/// # Examples
///
/// ```
/// use mediafetch::output::{classify, LineEvent, Phase};
///
/// let event = classify("[download]  45.2% of ~10.00MiB at 1.50MiB/s ETA 00:07");
/// let LineEvent::Progress(sample) = event else { panic!("expected progress") };
/// assert_eq!(sample.percent, 45.2);
/// assert_eq!(sample.total_bytes, Some(10 * 1024 * 1024));
/// assert_eq!(sample.rate_label(), "1.50 MiB/s");
/// assert_eq!(sample.eta_label(), "00:07");
/// assert_eq!(sample.phase, Phase::Downloading);
/// ```
pub fn classify(line: &str) -> LineEvent {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(sample) = parse_progress(line) {
        return LineEvent::Progress(sample);
    }

    let trimmed = line.trim_start();
    if PHASE_PREFIXES.iter().any(|prefix| trimmed.starts_with(prefix)) {
        return LineEvent::Phase {
            sample: RawProgressSample::merging(),
            destination: parse_postprocess_destination(trimmed),
        };
    }

    if let Some(destination) = parse_download_destination(trimmed) {
        return LineEvent::Destination(destination);
    }

    LineEvent::Unclassified
}

fn parse_progress(line: &str) -> Option<RawProgressSample> {
    let captures = progress_pattern().captures(line)?;

    let percent: f64 = captures.get(1)?.as_str().parse().ok()?;
    let magnitude: f64 = captures.get(2)?.as_str().parse().ok()?;
    let unit = captures.get(3)?.as_str();
    let total_bytes = units::to_bytes(magnitude, unit);

    let rate = rate_pattern()
        .captures(line)
        .and_then(|c| Some(format!("{} {}/s", c.get(1)?.as_str(), c.get(2)?.as_str())));

    let eta = eta_pattern()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    Some(RawProgressSample {
        percent: percent.clamp(0.0, 100.0),
        total_bytes: (total_bytes > 0).then_some(total_bytes),
        rate,
        eta,
        phase: Phase::Downloading,
    })
}

fn parse_postprocess_destination(line: &str) -> Option<Destination> {
    if let Some(captures) = merge_pattern().captures(line) {
        let path = captures.get(1)?.as_str();
        return (!path.is_empty()).then(|| Destination::new(DestinationKind::Merged, path));
    }

    // e.g. "[ExtractAudio] Destination: /music/song.mp3"
    let (_, path) = line.split_once(POSTPROCESS_DESTINATION)?;
    let path = path.trim();
    (!path.is_empty()).then(|| Destination::new(DestinationKind::Merged, path))
}

fn parse_download_destination(line: &str) -> Option<Destination> {
    if let Some(path) = line.strip_prefix(DOWNLOAD_DESTINATION) {
        let path = path.trim();
        return (!path.is_empty()).then(|| Destination::new(DestinationKind::Download, path));
    }

    let captures = already_downloaded_pattern().captures(line)?;
    let path = captures.get(1)?.as_str().trim();
    (!path.is_empty()).then(|| Destination::new(DestinationKind::AlreadyDownloaded, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn progress(line: &str) -> RawProgressSample {
        match classify(line) {
            LineEvent::Progress(sample) => sample,
            other => panic!("expected progress for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn test_progress_line_with_rate_and_eta() {
        let sample = progress("[download]  45.2% of ~10.00MiB at 1.50MiB/s ETA 00:07");

        assert_eq!(sample.percent, 45.2);
        assert_eq!(sample.total_bytes, Some(10 * 1024 * 1024));
        assert_eq!(sample.rate.as_deref(), Some("1.50 MiB/s"));
        assert_eq!(sample.eta.as_deref(), Some("00:07"));
        assert_eq!(sample.phase, Phase::Downloading);
    }

    #[test]
    fn test_progress_line_fractional_total() {
        let sample = progress("[download]  12.3% of 12.30MiB at 2.00MiB/s ETA 00:05");
        assert_eq!(sample.total_bytes, Some(units::to_bytes(12.3, "MiB")));
    }

    #[test]
    fn test_progress_line_decimal_units() {
        let sample = progress("[download]  50.0% of 200.00MB at 5.00MB/s ETA 00:20");
        assert_eq!(sample.total_bytes, Some(200_000_000));
        assert_eq!(sample.rate_label(), "5.00 MB/s");
    }

    #[test]
    fn test_progress_line_spaced_approximate_total() {
        let sample = progress("[download]   3.0% of ~  1.02GiB at  3.21MiB/s ETA 05:12 (frag 4/120)");
        assert_eq!(sample.total_bytes, Some(units::to_bytes(1.02, "GiB")));
        assert_eq!(sample.rate_label(), "3.21 MiB/s");
        assert_eq!(sample.eta_label(), "05:12");
    }

    #[test]
    fn test_progress_line_without_rate_or_eta_is_unknown() {
        let sample = progress("[download] 100% of 10.00MiB in 00:00:03 at 3.10MiB/s");
        assert_eq!(sample.percent, 100.0);
        assert_eq!(sample.eta, None);
        assert_eq!(sample.eta_label(), "?");

        let sample = progress("[download]   0.0% of 10.00MiB at Unknown B/s ETA Unknown");
        assert_eq!(sample.rate, None);
        assert_eq!(sample.rate_label(), "?");
        assert_eq!(sample.eta_label(), "?");
    }

    #[test]
    fn test_progress_line_long_eta() {
        let sample = progress("[download]   1.0% of 4.00GiB at 1.00MiB/s ETA 01:08:12");
        assert_eq!(sample.eta_label(), "01:08:12");
    }

    #[test]
    fn test_merger_line_captures_path_and_pins_percent() {
        let event = classify("[Merger] Merging formats into \"/tmp/out.mp4\"");

        let sample = event.sample().expect("merging sample");
        assert_eq!(sample.phase, Phase::Merging);
        assert_eq!(sample.percent, 99.9);
        assert_eq!(sample.total_bytes, None);

        let destination = event.destination().expect("merge destination");
        assert_eq!(destination.kind, DestinationKind::Merged);
        assert_eq!(destination.path, PathBuf::from("/tmp/out.mp4"));
    }

    #[test]
    fn test_fixup_and_ffmpeg_banners_are_phase_transitions() {
        for line in [
            "[FixupM3u8] Fixing MPEG-TS in MP4 container of \"/tmp/a.mp4\"",
            "[Fixup] Fixing something",
            "[ffmpeg] Correcting container of \"/tmp/a.mp4\"",
        ] {
            let event = classify(line);
            assert!(
                matches!(event, LineEvent::Phase { destination: None, .. }),
                "expected bare phase for {:?}, got {:?}",
                line,
                event
            );
        }
    }

    #[test]
    fn test_extract_audio_destination() {
        let event = classify("[ExtractAudio] Destination: /music/song.mp3");
        let destination = event.destination().expect("post-process destination");
        assert_eq!(destination.path, PathBuf::from("/music/song.mp3"));
        assert_eq!(event.sample().map(|s| s.phase), Some(Phase::Merging));
    }

    #[test]
    fn test_download_destination() {
        let event = classify("[download] Destination: /videos/clip.f137.mp4");
        assert_eq!(
            event,
            LineEvent::Destination(Destination::new(
                DestinationKind::Download,
                "/videos/clip.f137.mp4"
            ))
        );
    }

    #[test]
    fn test_already_downloaded() {
        let event = classify("[download] /videos/clip.mp4 has already been downloaded");
        assert_eq!(
            event,
            LineEvent::Destination(Destination::new(
                DestinationKind::AlreadyDownloaded,
                "/videos/clip.mp4"
            ))
        );
    }

    #[test]
    fn test_path_with_spaces_and_quotes_survives() {
        let event = classify("[download] Destination: /videos/My Clip [abc].webm");
        assert_eq!(
            event.destination().map(|d| d.path.clone()),
            Some(PathBuf::from("/videos/My Clip [abc].webm"))
        );
    }

    #[test]
    fn test_unclassified_lines() {
        for line in [
            "[youtube] Extracting URL: https://www.youtube.com/watch?v=abc",
            "[info] abc: Downloading 1 format(s): 137+140",
            "",
            "WARNING: something odd",
            "[download] 45% of nothing",
        ] {
            assert_eq!(classify(line), LineEvent::Unclassified, "line {:?}", line);
        }
    }

    #[test]
    fn test_trailing_carriage_return_is_ignored() {
        let sample = progress("[download]  10.0% of 1.00MiB at 1.00KiB/s ETA 10:00\r");
        assert_eq!(sample.eta_label(), "10:00");
    }

    #[test]
    fn test_parser_trait_delegates() {
        let parser: Box<dyn OutputParser> = Box::new(YtDlpTextParser::new());
        assert!(matches!(
            parser.classify("[download]  1.0% of 1.00MiB"),
            LineEvent::Progress(_)
        ));
    }
}
