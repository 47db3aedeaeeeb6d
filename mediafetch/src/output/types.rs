//! Structured events extracted from individual output lines.

use std::fmt;
use std::path::PathBuf;

/// Label used for any field the tool did not report.
///
/// Unknown must read differently from zero.
pub const UNKNOWN_LABEL: &str = "?";

/// Percent reported while post-processing runs.
///
/// Completion is only ever claimed by the terminal event.
pub const MERGING_PERCENT: f64 = 99.9;

/// Which stage of the download a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// A sub-transfer is receiving bytes.
    Downloading,
    /// Streams are being merged, fixed up or post-processed.
    Merging,
}

impl Phase {
    /// Stable lowercase name for the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Downloading => "downloading",
            Phase::Merging => "merging",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress reading taken from a single output line.
///
/// The percent is local to the current sub-transfer and restarts near zero
/// whenever the tool moves on to the next stream.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProgressSample {
    /// Percent complete of the current sub-transfer (0-100).
    pub percent: f64,
    /// Total size of the current sub-transfer in bytes, if reported.
    pub total_bytes: Option<u64>,
    /// Transfer rate as printed (`"1.50 MiB/s"`), if reported.
    pub rate: Option<String>,
    /// Estimated time remaining as printed (`"00:07"`), if reported.
    pub eta: Option<String>,
    /// Stage of the download.
    pub phase: Phase,
}

impl RawProgressSample {
    /// Sample for a line announcing post-processing.
    pub fn merging() -> Self {
        Self {
            percent: MERGING_PERCENT,
            total_bytes: None,
            rate: None,
            eta: None,
            phase: Phase::Merging,
        }
    }

    /// Rate label, `?` when the line carried none.
    pub fn rate_label(&self) -> &str {
        self.rate.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    /// ETA label, `?` when the line carried none.
    pub fn eta_label(&self) -> &str {
        self.eta.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

/// How a destination path was announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationKind {
    /// `[download] Destination: P` - a fresh download target.
    Download,
    /// `[Merger] Merging formats into "P"` or a post-processor destination.
    Merged,
    /// `[download] P has already been downloaded`.
    AlreadyDownloaded,
}

/// A file path announced in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// How the path was announced.
    pub kind: DestinationKind,
    /// The announced path, exactly as printed.
    pub path: PathBuf,
}

impl Destination {
    /// Create a destination of the given kind.
    pub fn new(kind: DestinationKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Classification of a single output line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineEvent {
    /// A download progress line.
    Progress(RawProgressSample),
    /// A merge/fixup/post-processing banner, possibly naming its output file.
    Phase {
        sample: RawProgressSample,
        destination: Option<Destination>,
    },
    /// A line announcing that a file now exists at a path.
    Destination(Destination),
    /// Anything else; carries no structural meaning.
    Unclassified,
}

impl LineEvent {
    /// The progress sample carried by this event, if any.
    pub fn sample(&self) -> Option<&RawProgressSample> {
        match self {
            LineEvent::Progress(sample) | LineEvent::Phase { sample, .. } => Some(sample),
            _ => None,
        }
    }

    /// The destination carried by this event, if any.
    pub fn destination(&self) -> Option<&Destination> {
        match self {
            LineEvent::Destination(destination) => Some(destination),
            LineEvent::Phase { destination, .. } => destination.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merging_sample_is_pinned_below_completion() {
        let sample = RawProgressSample::merging();
        assert_eq!(sample.percent, 99.9);
        assert_eq!(sample.phase, Phase::Merging);
        assert_eq!(sample.total_bytes, None);
        assert_eq!(sample.rate_label(), "?");
        assert_eq!(sample.eta_label(), "?");
    }

    #[test]
    fn test_line_event_accessors() {
        let dest = Destination::new(DestinationKind::Merged, "/tmp/out.mp4");
        let event = LineEvent::Phase {
            sample: RawProgressSample::merging(),
            destination: Some(dest.clone()),
        };
        assert_eq!(event.destination(), Some(&dest));
        assert!(event.sample().is_some());

        assert!(LineEvent::Unclassified.sample().is_none());
        assert!(LineEvent::Unclassified.destination().is_none());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Downloading.to_string(), "downloading");
        assert_eq!(Phase::Merging.to_string(), "merging");
    }
}
