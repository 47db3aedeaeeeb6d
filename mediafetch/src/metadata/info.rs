//! Decoded `-J` output and format selection.

use serde::{Deserialize, Deserializer};

use crate::units::format_bytes;

/// Codec value yt-dlp uses for "this stream has no such track".
const NO_CODEC: &str = "none";

/// Format id YouTube uses for its standard m4a audio track.
const PREFERRED_AUDIO_FORMAT: &str = "140";

/// Selector suffix that merges a video-only format with the best audio.
pub const BEST_AUDIO_SUFFIX: &str = "+bestaudio";

/// Information about a media page, as printed by `yt-dlp -J`.
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaInfo {
    /// Extractor-specific media id.
    pub id: String,
    /// Media title.
    #[serde(default)]
    pub title: String,
    /// Available formats.
    #[serde(default)]
    pub formats: Vec<FormatDescriptor>,
    /// Thumbnail URL.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl MediaInfo {
    /// Parse the JSON document printed by `yt-dlp -J`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Find a format by id.
    pub fn format(&self, format_id: &str) -> Option<&FormatDescriptor> {
        self.formats.iter().find(|f| f.format_id == format_id)
    }

    /// The audio format merged with video-only selections.
    ///
    /// Prefers format `140`, otherwise the first audio-only format listed.
    pub fn best_audio(&self) -> Option<&FormatDescriptor> {
        self.formats
            .iter()
            .find(|f| f.format_id == PREFERRED_AUDIO_FORMAT || f.is_audio_only())
    }

    /// Duration formatted as `H:MM:SS` or `M:SS`.
    pub fn duration_label(&self) -> Option<String> {
        let total = self.duration?.max(0.0).round() as u64;
        let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
        Some(if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{}:{:02}", minutes, seconds)
        })
    }
}

/// One downloadable format.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    #[serde(default)]
    pub format_note: Option<String>,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub resolution: Option<String>,
    /// Total bitrate in KBit/s.
    #[serde(default)]
    pub tbr: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub filesize: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub filesize_approx: Option<u64>,
}

impl FormatDescriptor {
    fn has_codec(codec: &Option<String>) -> bool {
        codec.as_deref().is_some_and(|c| c != NO_CODEC)
    }

    fn lacks_codec(codec: &Option<String>) -> bool {
        codec.as_deref() == Some(NO_CODEC)
    }

    /// Video track without audio; needs merging to be watchable with sound.
    pub fn is_video_only(&self) -> bool {
        Self::has_codec(&self.vcodec) && Self::lacks_codec(&self.acodec)
    }

    /// Audio track without video.
    pub fn is_audio_only(&self) -> bool {
        Self::has_codec(&self.acodec) && Self::lacks_codec(&self.vcodec)
    }

    /// Exact size if known, otherwise the approximate one. Zero counts as unknown.
    pub fn size(&self) -> Option<u64> {
        self.filesize
            .filter(|&size| size > 0)
            .or(self.filesize_approx.filter(|&size| size > 0))
    }

    /// One-line description for format pickers.
    ///
    /// `1920x1080 • MP4 • 120.5 MB (+ audio) • 1080p`
    pub fn label(&self) -> String {
        let mut label = format!(
            "{} • {}",
            self.resolution.as_deref().unwrap_or("Audio"),
            self.ext.to_uppercase()
        );
        if let Some(size) = self.filesize.filter(|&size| size > 0) {
            label.push_str(&format!(" • {}", format_bytes(size)));
        }
        if self.is_video_only() {
            label.push_str(" (+ audio)");
        }
        if let Some(note) = self.format_note.as_deref().filter(|n| !n.is_empty()) {
            label.push_str(&format!(" • {}", note));
        }
        label
    }
}

/// Accepts sizes printed as integers or floats.
fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64))
}

/// A format choice resolved into a selector and an expected size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelection {
    /// Selector to pass with `-f`.
    pub selector: String,
    /// Expected total bytes across all merged streams; 0 when unknown.
    pub expected_bytes: u64,
    /// Whether audio is merged in.
    pub merges_audio: bool,
}

impl FormatSelection {
    /// Resolve `format_id` against `info`.
    ///
    /// A video-only format is merged with `bestaudio`, and the best audio
    /// format's size is added to the expectation. An id not listed in `info`
    /// is passed through as a raw selector with no expected size.
    pub fn from_info(info: &MediaInfo, format_id: &str) -> Self {
        let Some(format) = info.format(format_id) else {
            return Self {
                selector: format_id.to_string(),
                expected_bytes: 0,
                merges_audio: false,
            };
        };

        let mut expected_bytes = format.size().unwrap_or(0);
        if !format.is_video_only() {
            return Self {
                selector: format_id.to_string(),
                expected_bytes,
                merges_audio: false,
            };
        }

        expected_bytes += info.best_audio().and_then(|a| a.size()).unwrap_or(0);
        Self {
            selector: format!("{}{}", format_id, BEST_AUDIO_SUFFIX),
            expected_bytes,
            merges_audio: true,
        }
    }
}
