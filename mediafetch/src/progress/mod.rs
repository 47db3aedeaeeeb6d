//! Overall progress for downloads made of several sub-transfers.
//!
//! ```text
//! RawProgressSample ──► ProgressAggregator ──► ProgressSnapshot
//!                          │
//!                          ├── BoundaryDetector   (new sub-transfer?)
//!                          └── AggregatedProgress (banked / current / total)
//! ```
//!
//! The snapshot's percent never goes backwards and stays at or below 99.9
//! until the download is reported complete.

mod aggregator;
mod boundary;
mod snapshot;

pub use aggregator::{AggregatedProgress, ProgressAggregator, ProgressStatus, MAX_ACTIVE_PERCENT};
pub use boundary::{
    is_subtransfer_boundary, BoundaryDetector, PercentDropDetector, DEFAULT_BOUNDARY_THRESHOLD,
};
pub use snapshot::ProgressSnapshot;
