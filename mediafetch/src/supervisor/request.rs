//! Download identity and request types.

use std::fmt;

/// Caller-chosen identifier of a logical download.
///
/// Unique among active downloads; may be reused once a download has ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DownloadId(String);

impl DownloadId {
    /// Create a new download identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DownloadId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DownloadId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What to download and where to put it.
///
/// Consumed once when the process is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Target URL, passed through untouched.
    pub url: String,
    /// Format selector such as `"137+140"`; `None` leaves the choice to yt-dlp.
    pub format: Option<String>,
    /// Output path template; placeholders such as `%(title)s` are resolved
    /// by yt-dlp.
    pub output_template: String,
}

impl DownloadRequest {
    /// Create a new request without a format selector.
    ///
    /// # Arguments
    ///
    /// * `url` - Media page URL
    /// * `output_template` - Destination path template
    pub fn new(url: impl Into<String>, output_template: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: None,
            output_template: output_template.into(),
        }
    }

    /// Set the format selector. Blank selectors are treated as absent.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        let format = format.into();
        self.format = if format.trim().is_empty() {
            None
        } else {
            Some(format)
        };
        self
    }
}
