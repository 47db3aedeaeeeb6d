//! Sub-transfer boundary detection.
//!
//! yt-dlp does not say "stream 2 of 3 starts now". When a download fetches
//! video and audio separately, the only visible sign is the percentage
//! starting over. A drop from above the threshold is taken as the previous
//! sub-transfer having finished.
//!
//! Known imprecision: a single stream whose percentage dips after a resume
//! from above the threshold is banked twice, and a sub-transfer that
//! restarts at a high percentage is missed. Both produce a small mid-run
//! re-estimate rather than visible flicker.

use std::fmt;

/// Percent the previous reading must exceed for a drop to count as a boundary.
pub const DEFAULT_BOUNDARY_THRESHOLD: f64 = 50.0;

/// Decides whether a new percentage reading starts a new sub-transfer.
pub trait BoundaryDetector: Send + Sync + fmt::Debug {
    /// Returns true if `current` begins a new sub-transfer after `previous`.
    fn is_boundary(&self, previous: f64, current: f64) -> bool;
}

/// Treats a percent drop from above a threshold as a new sub-transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentDropDetector {
    threshold: f64,
}

impl PercentDropDetector {
    /// Create a detector with a custom threshold (percent, 0-100).
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 100.0),
        }
    }

    /// The configured threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for PercentDropDetector {
    fn default() -> Self {
        Self::new(DEFAULT_BOUNDARY_THRESHOLD)
    }
}

impl BoundaryDetector for PercentDropDetector {
    fn is_boundary(&self, previous: f64, current: f64) -> bool {
        is_subtransfer_boundary(previous, current, self.threshold)
    }
}

/// The percent-drop heuristic on its own.
///
/// # Examples
///
/// ```
/// use mediafetch::progress::is_subtransfer_boundary;
///
/// assert!(is_subtransfer_boundary(99.8, 0.1, 50.0));
/// assert!(!is_subtransfer_boundary(40.0, 0.1, 50.0));
/// assert!(!is_subtransfer_boundary(60.0, 70.0, 50.0));
/// ```
pub fn is_subtransfer_boundary(previous: f64, current: f64, threshold: f64) -> bool {
    current < previous && previous > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_from_high_percent_is_boundary() {
        let detector = PercentDropDetector::default();
        assert!(detector.is_boundary(100.0, 0.0));
        assert!(detector.is_boundary(90.0, 5.0));
        assert!(detector.is_boundary(50.1, 50.0));
    }

    #[test]
    fn test_drop_from_low_percent_is_not_boundary() {
        let detector = PercentDropDetector::default();
        assert!(!detector.is_boundary(50.0, 0.0));
        assert!(!detector.is_boundary(12.0, 3.0));
    }

    #[test]
    fn test_rise_is_never_boundary() {
        let detector = PercentDropDetector::default();
        assert!(!detector.is_boundary(60.0, 60.0));
        assert!(!detector.is_boundary(60.0, 99.0));
    }

    #[test]
    fn test_custom_threshold() {
        let detector = PercentDropDetector::new(80.0);
        assert_eq!(detector.threshold(), 80.0);
        assert!(!detector.is_boundary(70.0, 1.0));
        assert!(detector.is_boundary(85.0, 1.0));
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(PercentDropDetector::new(150.0).threshold(), 100.0);
        assert_eq!(PercentDropDetector::new(-3.0).threshold(), 0.0);
    }
}
