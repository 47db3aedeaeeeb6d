//! Events emitted by a supervised download.

use std::path::PathBuf;

use crate::output::RawProgressSample;

/// Raw per-download event, in the order the process produced it.
///
/// Exactly one terminal event (`Completed`, `Failed` or `Cancelled`) is sent
/// per download, except when the process dies from a signal nobody asked
/// for; then the channel simply closes.
#[derive(Debug, Clone, PartialEq)]
pub enum SupervisorEvent {
    /// The process was spawned.
    Started {
        /// OS process id, if still available.
        pid: Option<u32>,
    },
    /// A progress or phase sample from stdout.
    Sample(RawProgressSample),
    /// A raw output line. Stderr lines carry a `[stderr] ` prefix.
    Log(String),
    /// The process exited with code 0.
    Completed {
        /// Last announced destination, or the output template if none was seen.
        path: PathBuf,
    },
    /// The process could not be started or exited unsuccessfully.
    Failed {
        /// Human-readable description including any stderr output.
        message: String,
        /// Exit code, if the process ran and exited normally.
        exit_code: Option<i32>,
    },
    /// The download was cancelled by the caller.
    Cancelled,
}

impl SupervisorEvent {
    /// Whether this event ends the download.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SupervisorEvent::Completed { .. }
                | SupervisorEvent::Failed { .. }
                | SupervisorEvent::Cancelled
        )
    }
}
