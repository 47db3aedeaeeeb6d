//! Media information lookup.
//!
//! Runs yt-dlp in information-only mode and decodes its JSON, then turns a
//! chosen format into the selector and size expectation a download needs:
//!
//! ```text
//! fetch_metadata(url) ──► MediaInfo ──► FormatSelection::from_info(info, "137")
//!                                          ├── selector: "137+bestaudio"
//!                                          └── expected_bytes ──► ProgressAggregator seed
//! ```

mod fetch;
mod info;

pub use fetch::fetch_metadata;
pub use info::{FormatDescriptor, FormatSelection, MediaInfo, BEST_AUDIO_SUFFIX};
