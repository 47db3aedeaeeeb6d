//! Display-ready progress values.

use crate::output::{Phase, UNKNOWN_LABEL};
use crate::units::format_bytes;

/// Point-in-time view of one download's progress, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// Overall percent (0-100). Only reaches 100 on completion.
    pub percent: f64,
    /// Bytes downloaded across all sub-transfers, if a size is known.
    pub downloaded_bytes: Option<u64>,
    /// Best estimate of the full download size, if known.
    pub total_bytes: Option<u64>,
    /// Current transfer rate as printed by the tool (`?` if unknown).
    pub rate_label: String,
    /// Estimated time remaining as printed by the tool (`?` if unknown).
    pub eta_label: String,
    /// Stage of the download.
    pub phase: Phase,
}

impl ProgressSnapshot {
    /// Snapshot for a download that has not reported anything yet.
    pub fn initial() -> Self {
        Self {
            percent: 0.0,
            downloaded_bytes: None,
            total_bytes: None,
            rate_label: UNKNOWN_LABEL.to_string(),
            eta_label: UNKNOWN_LABEL.to_string(),
            phase: Phase::Downloading,
        }
    }

    /// Downloaded amount as a human-readable label.
    pub fn downloaded_label(&self) -> String {
        label(self.downloaded_bytes)
    }

    /// Total size as a human-readable label.
    pub fn total_label(&self) -> String {
        label(self.total_bytes)
    }

    /// Whole percent for compact display.
    ///
    /// Truncates, so a held 99.9 never reads as 100 before completion.
    pub fn whole_percent(&self) -> u8 {
        self.percent.floor().clamp(0.0, 100.0) as u8
    }
}

fn label(bytes: Option<u64>) -> String {
    bytes
        .map(format_bytes)
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot_is_unknown() {
        let snapshot = ProgressSnapshot::initial();
        assert_eq!(snapshot.percent, 0.0);
        assert_eq!(snapshot.downloaded_label(), "?");
        assert_eq!(snapshot.total_label(), "?");
        assert_eq!(snapshot.rate_label, "?");
    }

    #[test]
    fn test_labels_format_bytes() {
        let snapshot = ProgressSnapshot {
            downloaded_bytes: Some(1536),
            total_bytes: Some(10 * 1024 * 1024),
            ..ProgressSnapshot::initial()
        };
        assert_eq!(snapshot.downloaded_label(), "1.5 KB");
        assert_eq!(snapshot.total_label(), "10 MB");
    }

    #[test]
    fn test_whole_percent_never_rounds_up_to_done() {
        let snapshot = ProgressSnapshot {
            percent: 99.9,
            ..ProgressSnapshot::initial()
        };
        assert_eq!(snapshot.whole_percent(), 99);
    }
}
