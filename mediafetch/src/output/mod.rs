//! Line classification for the external tool's output.
//!
//! yt-dlp has no structured progress channel we can rely on, so every line
//! it prints is classified on its own:
//!
//! ```text
//! stdout line ──► OutputParser::classify ──► LineEvent
//!                                               ├── Progress(RawProgressSample)
//!                                               ├── Phase { sample, destination }
//!                                               ├── Destination(Destination)
//!                                               └── Unclassified
//! ```
//!
//! Classification is pure: no state survives between lines. Anything the
//! parser does not recognise is relayed untouched as a log line and never
//! treated as an error.

mod parser;
mod types;

pub use parser::{classify, OutputParser, YtDlpTextParser};
pub use types::{
    Destination, DestinationKind, LineEvent, Phase, RawProgressSample, MERGING_PERCENT,
    UNKNOWN_LABEL,
};
