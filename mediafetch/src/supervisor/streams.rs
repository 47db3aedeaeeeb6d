//! Line pumps for the child's output streams.
//!
//! Lines are read as raw bytes and decoded lossily: yt-dlp prints titles and
//! paths in the console's code page, which need not be UTF-8. A pump keeps
//! draining until end of stream so the child never writes into a closed pipe.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::trace;

use super::events::SupervisorEvent;
use crate::output::{Destination, OutputParser};

/// Prefix added to stderr lines relayed as logs.
pub const STDERR_PREFIX: &str = "[stderr] ";

/// Reads newline-terminated lines, replacing invalid UTF-8 with U+FFFD.
struct LossyLines<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LossyLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: Vec::new(),
        }
    }

    /// Next line without its terminator, or `None` at end of stream.
    async fn next_line(&mut self) -> Option<String> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf).await {
            Ok(0) => None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&self.buf);
                Some(line.trim_end_matches(['\n', '\r']).to_string())
            }
            Err(e) => {
                trace!(error = %e, "Output stream read ended");
                None
            }
        }
    }
}

/// Read stdout line by line, relaying and classifying each one.
///
/// Returns the most recently announced destination.
pub async fn pump_stdout<R>(
    stdout: R,
    parser: Arc<dyn OutputParser>,
    events: mpsc::UnboundedSender<SupervisorEvent>,
) -> Option<Destination>
where
    R: AsyncRead + Unpin,
{
    let mut lines = LossyLines::new(stdout);
    let mut destination = None;

    while let Some(line) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }

        let event = parser.classify(&line);
        let _ = events.send(SupervisorEvent::Log(line));

        if let Some(found) = event.destination() {
            destination = Some(found.clone());
        }
        if let Some(sample) = event.sample() {
            let _ = events.send(SupervisorEvent::Sample(sample.clone()));
        }
    }

    destination
}

/// Read stderr line by line, relaying each as a prefixed log.
///
/// Returns the accumulated stderr text for failure reporting.
pub async fn pump_stderr<R>(stderr: R, events: mpsc::UnboundedSender<SupervisorEvent>) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = LossyLines::new(stderr);
    let mut collected = String::new();

    while let Some(line) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let _ = events.send(SupervisorEvent::Log(format!("{STDERR_PREFIX}{line}")));
        if !collected.is_empty() {
            collected.push('\n');
        }
        collected.push_str(&line);
    }

    collected
}
