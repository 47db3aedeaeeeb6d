//! Supervision of external yt-dlp processes.
//!
//! One process per logical download, tracked by identity:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                       ProcessSupervisor                         │
//! │                                                                 │
//! │  DownloadRequest ──► build_download_args ──► Command::spawn     │
//! │                                                  │              │
//! │  DownloadRegistry  ◄── reserve / mark_running ───┤              │
//! │  (id ──► generation, pid, cancel token)          │              │
//! │                                                  ▼              │
//! │                                           DownloadContext       │
//! │                                   stdout ──► OutputParser       │
//! │                                   stderr ──► "[stderr] " logs   │
//! │                                                  │              │
//! │                    mpsc::UnboundedSender<SupervisorEvent>       │
//! └──────────────────────────────────────────────────┼──────────────┘
//!                                                    ▼
//!                                          per-download receiver
//! ```
//!
//! Events for one download arrive in the order the process produced them.
//! There is no ordering across downloads.

mod args;
mod events;
mod executable;
mod process;
mod registry;
mod request;
mod streams;

pub use args::{
    build_download_args, build_metadata_args, DOWNLOAD_FLAGS, METADATA_FLAGS, URL_SEPARATOR,
};
pub use events::SupervisorEvent;
pub use executable::{
    binary_name, bundled_path, platform_dir, ExecutableConfig, ExecutableSpec, DEFAULT_PROGRAM,
    DEFAULT_SEARCH_PATH,
};
pub use process::{
    default_ffmpeg_location, default_search_path, ProcessSupervisor, SupervisorConfig,
    MACOS_FFMPEG_LOCATION,
};
pub use registry::{DownloadRegistry, DownloadState, Reservation, TakenDownload};
pub use request::{DownloadId, DownloadRequest};
pub use streams::STDERR_PREFIX;
