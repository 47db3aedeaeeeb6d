//! mediafetch - download orchestration for yt-dlp
//!
//! This library spawns and supervises yt-dlp processes, turns their
//! line-oriented output into structured progress, and reports one overall,
//! never-decreasing percentage per download even when yt-dlp fetches video
//! and audio as separate transfers.
//!
//! # Architecture
//!
//! ```text
//! DownloadService
//!   ├── ProcessSupervisor ── DownloadRegistry (id ──► running process)
//!   │        │
//!   │        └── stdout lines ──► output::classify ──► SupervisorEvent
//!   │
//!   └── DownloadSession (one per download)
//!            └── ProgressAggregator ──► DownloadEvent
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mediafetch::service::{DownloadEvent, DownloadService};
//! use mediafetch::supervisor::{DownloadId, DownloadRequest, SupervisorConfig};
//!
//! let service = DownloadService::new(SupervisorConfig::default());
//! let request = DownloadRequest::new(url, "/tmp/%(title)s.%(ext)s").with_format("137+bestaudio");
//! let mut session = service.start_download(DownloadId::new("1"), request)?;
//!
//! while let Some(event) = session.next_event().await {
//!     if let DownloadEvent::Progress(snapshot) = event {
//!         println!("{:.1}% of {}", snapshot.percent, snapshot.total_label());
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod progress;
pub mod service;
pub mod supervisor;
pub mod units;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
