//! Per-download progress aggregation.
//!
//! A logical download may be several sequential sub-transfers (video, then
//! audio, then a merge), each restarting its own percentage near zero. The
//! aggregator folds those readings into one overall figure that only moves
//! forward.
//!
//! # Algorithm
//!
//! For each [`RawProgressSample`]:
//!
//! 1. If the [`BoundaryDetector`] sees the start of a new sub-transfer, the
//!    previous sub-transfer's last byte count is banked.
//! 2. The current sub-transfer's bytes are `percent / 100 * total`.
//! 3. The expected total becomes `banked + current total` if that is larger
//!    than the best estimate so far. It never shrinks.
//! 4. Displayed percent is `(banked + current) / expected * 100`, clamped to
//!    [`MAX_ACTIVE_PERCENT`] and never below the previous displayed value.
//! 5. With no size ever reported, the raw percent is echoed (same clamps).
//!
//! Completion snaps to exactly 100% with downloaded == total. After any
//! terminal outcome further samples are ignored.

use crate::output::{Phase, RawProgressSample, MERGING_PERCENT, UNKNOWN_LABEL};

use super::boundary::{BoundaryDetector, PercentDropDetector};
use super::snapshot::ProgressSnapshot;

/// Highest percent shown before the terminal `completed` event.
pub const MAX_ACTIVE_PERCENT: f64 = 99.9;

/// Lifecycle of the aggregated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    /// Samples are still being folded in.
    Active,
    /// The download finished successfully.
    Completed,
    /// The download failed.
    Failed,
    /// The download was cancelled.
    Cancelled,
}

impl ProgressStatus {
    /// Whether the status is final.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressStatus::Active)
    }
}

/// Raw byte accounting behind the displayed figures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedProgress {
    /// Best estimate of the full size. Zero until something is known.
    pub total_expected_bytes: u64,
    /// Bytes of sub-transfers inferred to have finished.
    pub banked_bytes: u64,
    /// Bytes of the sub-transfer in progress.
    pub current_subtransfer_bytes: u64,
    /// Raw percent of the last downloading sample.
    pub last_observed_percent: f64,
}

impl AggregatedProgress {
    /// Bytes downloaded so far across all sub-transfers.
    pub fn downloaded_bytes(&self) -> u64 {
        self.banked_bytes + self.current_subtransfer_bytes
    }
}

/// Folds raw samples for one download into a monotonic snapshot.
#[derive(Debug)]
pub struct ProgressAggregator {
    progress: AggregatedProgress,
    detector: Box<dyn BoundaryDetector>,
    snapshot: ProgressSnapshot,
    size_known: bool,
    status: ProgressStatus,
}

impl Default for ProgressAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressAggregator {
    /// Create an aggregator with the default percent-drop detector.
    pub fn new() -> Self {
        Self::with_detector(Box::new(PercentDropDetector::default()))
    }

    /// Create an aggregator with a custom boundary detector.
    pub fn with_detector(detector: Box<dyn BoundaryDetector>) -> Self {
        Self {
            progress: AggregatedProgress::default(),
            detector,
            snapshot: ProgressSnapshot::initial(),
            size_known: false,
            status: ProgressStatus::Active,
        }
    }

    /// Seed the expected total, e.g. from the selected formats' sizes.
    ///
    /// A zero seed is ignored.
    pub fn with_expected_total(mut self, bytes: u64) -> Self {
        if bytes > 0 {
            self.progress.total_expected_bytes = bytes;
            self.snapshot.total_bytes = Some(bytes);
        }
        self
    }

    /// Current byte accounting.
    pub fn progress(&self) -> &AggregatedProgress {
        &self.progress
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    /// Current status.
    pub fn status(&self) -> ProgressStatus {
        self.status
    }

    /// Fold one sample in and return the updated snapshot.
    ///
    /// Returns `None` once the download has reached a terminal state; late
    /// output flushed after exit must not reopen the display.
    pub fn apply(&mut self, sample: &RawProgressSample) -> Option<ProgressSnapshot> {
        if self.status.is_terminal() {
            return None;
        }

        match sample.phase {
            Phase::Downloading => self.apply_download(sample),
            Phase::Merging => self.apply_merging(),
        }

        self.snapshot.phase = sample.phase;
        self.snapshot.rate_label = sample.rate_label().to_string();
        self.snapshot.eta_label = sample.eta_label().to_string();

        Some(self.snapshot.clone())
    }

    fn apply_download(&mut self, sample: &RawProgressSample) {
        let percent = sample.percent.clamp(0.0, 100.0);
        let state = &mut self.progress;

        if self.detector.is_boundary(state.last_observed_percent, percent) {
            state.banked_bytes += state.current_subtransfer_bytes;
            state.current_subtransfer_bytes = 0;
        }

        match sample.total_bytes.filter(|&total| total > 0) {
            Some(total) => {
                state.current_subtransfer_bytes = (percent / 100.0 * total as f64).round() as u64;
                state.total_expected_bytes =
                    state.total_expected_bytes.max(state.banked_bytes + total);
                self.size_known = true;
            }
            None => {
                // unknown for display, zero for accumulation
                state.current_subtransfer_bytes = 0;
            }
        }
        state.last_observed_percent = percent;

        let computed = if state.total_expected_bytes > 0 {
            state.downloaded_bytes() as f64 / state.total_expected_bytes as f64 * 100.0
        } else {
            percent
        };
        self.advance_percent(computed);

        if self.size_known {
            let downloaded = self
                .snapshot
                .downloaded_bytes
                .unwrap_or(0)
                .max(self.progress.downloaded_bytes());
            self.snapshot.downloaded_bytes = Some(downloaded);
        }
        if self.progress.total_expected_bytes > 0 {
            self.snapshot.total_bytes = Some(self.progress.total_expected_bytes);
        }
    }

    fn apply_merging(&mut self) {
        // Every stream is in; byte accounting stays as the last sub-transfer left it.
        self.advance_percent(MERGING_PERCENT);
    }

    fn advance_percent(&mut self, computed: f64) {
        let computed = if computed.is_finite() { computed } else { 0.0 };
        self.snapshot.percent = computed
            .max(self.snapshot.percent)
            .min(MAX_ACTIVE_PERCENT);
    }

    /// Apply the terminal `completed` event.
    ///
    /// Snaps to 100% with downloaded equal to total. Returns `None` if a
    /// terminal state was already reached.
    pub fn complete(&mut self) -> Option<ProgressSnapshot> {
        if self.status.is_terminal() {
            return None;
        }
        self.status = ProgressStatus::Completed;

        let total = self
            .snapshot
            .total_bytes
            .or(self.snapshot.downloaded_bytes)
            .filter(|&bytes| bytes > 0);

        self.snapshot.percent = 100.0;
        self.snapshot.total_bytes = total;
        self.snapshot.downloaded_bytes = total;
        self.snapshot.eta_label = UNKNOWN_LABEL.to_string();

        Some(self.snapshot.clone())
    }

    /// Apply the terminal `failed` event. Returns false if already terminal.
    pub fn fail(&mut self) -> bool {
        self.finish(ProgressStatus::Failed)
    }

    /// Apply the terminal `cancelled` event. Returns false if already terminal.
    pub fn cancel(&mut self) -> bool {
        self.finish(ProgressStatus::Cancelled)
    }

    fn finish(&mut self, status: ProgressStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        true
    }
}
