//! Registry of active downloads.
//!
//! Maps each [`DownloadId`] to the handle of its supervised process. An entry
//! exists only while a download is `Spawning` or `Running`; terminal states
//! are reported through events, never stored.
//!
//! Every entry carries a generation number. Whoever removes the entry for a
//! given generation (exit cleanup or cancellation) is the single party that
//! emits the terminal event, so a download ends exactly once even when a
//! cancel races the process exit.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::events::SupervisorEvent;
use super::request::DownloadId;
use crate::error::{SupervisorError, SupervisorResult};

/// Lifecycle of a download as seen by the supervisor.
///
/// ```text
/// Idle ──► Spawning ──► Running ──► Completed | Failed | Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    /// Nothing is active for the identifier.
    Idle,
    /// Registered; the process is being launched.
    Spawning,
    /// The process is running.
    Running,
    /// Exited with code 0.
    Completed,
    /// Failed to launch or exited with a non-zero code.
    Failed,
    /// Cancelled by the caller.
    Cancelled,
}

impl DownloadState {
    /// Whether a registry entry exists in this state.
    pub fn is_active(&self) -> bool {
        matches!(self, DownloadState::Spawning | DownloadState::Running)
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DownloadState::Idle => "idle",
            DownloadState::Spawning => "spawning",
            DownloadState::Running => "running",
            DownloadState::Completed => "completed",
            DownloadState::Failed => "failed",
            DownloadState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Proof of a successful [`DownloadRegistry::reserve`].
#[derive(Debug, Clone)]
pub struct Reservation {
    /// Generation of the new entry.
    pub generation: u64,
    /// Cancelled when the caller cancels the download.
    pub cancellation: CancellationToken,
}

/// An entry removed by [`DownloadRegistry::take`].
#[derive(Debug)]
pub struct TakenDownload {
    /// State the download was in when removed.
    pub state: DownloadState,
    /// OS process id, if the process had started.
    pub pid: Option<u32>,
    /// Token watched by the supervising task.
    pub cancellation: CancellationToken,
    /// Channel to the download's consumer.
    pub events: mpsc::UnboundedSender<SupervisorEvent>,
}

#[derive(Debug)]
struct Entry {
    generation: u64,
    state: DownloadState,
    pid: Option<u32>,
    cancellation: CancellationToken,
    events: mpsc::UnboundedSender<SupervisorEvent>,
}

/// Thread-safe map of active downloads.
#[derive(Debug, Default)]
pub struct DownloadRegistry {
    entries: Mutex<HashMap<DownloadId, Entry>>,
    next_generation: AtomicU64,
}

impl DownloadRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` in the `Spawning` state.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::DuplicateIdentifier`] if `id` is already
    /// active. The existing entry is left untouched.
    pub fn reserve(
        &self,
        id: &DownloadId,
        events: mpsc::UnboundedSender<SupervisorEvent>,
    ) -> SupervisorResult<Reservation> {
        let mut entries = self.entries.lock();
        if entries.contains_key(id) {
            return Err(SupervisorError::DuplicateIdentifier(id.clone()));
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancellation = CancellationToken::new();
        entries.insert(
            id.clone(),
            Entry {
                generation,
                state: DownloadState::Spawning,
                pid: None,
                cancellation: cancellation.clone(),
                events,
            },
        );

        Ok(Reservation {
            generation,
            cancellation,
        })
    }

    /// Move the entry of the given generation to `Running`.
    ///
    /// Returns false if the entry is gone (e.g. cancelled while spawning).
    pub fn mark_running(&self, id: &DownloadId, generation: u64, pid: Option<u32>) -> bool {
        let mut entries = self.entries.lock();
        match entries.get_mut(id) {
            Some(entry) if entry.generation == generation => {
                entry.state = DownloadState::Running;
                entry.pid = pid;
                true
            }
            _ => false,
        }
    }

    /// Remove the entry if it still belongs to `generation`.
    ///
    /// Returns true if this call removed it; the caller then owns the
    /// terminal event.
    pub fn release(&self, id: &DownloadId, generation: u64) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(id) {
            Some(entry) if entry.generation == generation => {
                entries.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Remove the entry for `id` regardless of generation.
    ///
    /// Used by cancellation; the caller owns the terminal event.
    pub fn take(&self, id: &DownloadId) -> Option<TakenDownload> {
        self.entries.lock().remove(id).map(|entry| TakenDownload {
            state: entry.state,
            pid: entry.pid,
            cancellation: entry.cancellation,
            events: entry.events,
        })
    }

    /// Current state of `id`; `Idle` when nothing is active.
    pub fn state(&self, id: &DownloadId) -> DownloadState {
        self.entries
            .lock()
            .get(id)
            .map(|entry| entry.state)
            .unwrap_or(DownloadState::Idle)
    }

    /// Process id of the active download, if running.
    pub fn pid(&self, id: &DownloadId) -> Option<u32> {
        self.entries.lock().get(id).and_then(|entry| entry.pid)
    }

    /// Whether `id` is active.
    pub fn contains(&self, id: &DownloadId) -> bool {
        self.entries.lock().contains_key(id)
    }

    /// Identifiers of all active downloads, sorted.
    pub fn active_ids(&self) -> Vec<DownloadId> {
        let mut ids: Vec<DownloadId> = self.entries.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of active downloads.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no download is active.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
