//! The consumer side of one download.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::progress::{ProgressAggregator, ProgressSnapshot, ProgressStatus};
use crate::supervisor::{DownloadId, SupervisorEvent};

/// Normalized event delivered to a presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// The process was spawned.
    Started,
    /// Overall progress changed.
    Progress(ProgressSnapshot),
    /// A raw output line.
    Log(String),
    /// The download finished.
    Completed {
        /// Resolved path of the produced file.
        path: PathBuf,
        /// Final snapshot, at 100%.
        progress: ProgressSnapshot,
    },
    /// The download could not start or ended unsuccessfully.
    Failed {
        message: String,
        exit_code: Option<i32>,
    },
    /// The download was cancelled.
    Cancelled,
}

impl DownloadEvent {
    /// Whether this is the last event of the session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DownloadEvent::Completed { .. } | DownloadEvent::Failed { .. } | DownloadEvent::Cancelled
        )
    }
}

/// Ordered event stream for one download, folded through its own
/// [`ProgressAggregator`].
///
/// After the terminal event, [`next_event`](Self::next_event) returns `None`
/// and anything the process still flushes is discarded. It also returns
/// `None` if the process vanished without an outcome (killed by a signal
/// from outside).
#[derive(Debug)]
pub struct DownloadSession {
    id: DownloadId,
    receiver: mpsc::UnboundedReceiver<SupervisorEvent>,
    aggregator: ProgressAggregator,
}

impl DownloadSession {
    /// Create a session over a supervisor event channel.
    pub fn new(
        id: DownloadId,
        receiver: mpsc::UnboundedReceiver<SupervisorEvent>,
        aggregator: ProgressAggregator,
    ) -> Self {
        Self {
            id,
            receiver,
            aggregator,
        }
    }

    /// The download's identifier.
    pub fn id(&self) -> &DownloadId {
        &self.id
    }

    /// Latest progress snapshot.
    pub fn progress(&self) -> &ProgressSnapshot {
        self.aggregator.snapshot()
    }

    /// Current status.
    pub fn status(&self) -> ProgressStatus {
        self.aggregator.status()
    }

    /// Next event, or `None` once the download has ended.
    pub async fn next_event(&mut self) -> Option<DownloadEvent> {
        loop {
            if self.aggregator.status().is_terminal() {
                return None;
            }
            let event = self.receiver.recv().await?;
            if let Some(event) = self.translate(event) {
                return Some(event);
            }
        }
    }

    /// Consume the session, returning only its terminal event.
    pub async fn wait(mut self) -> Option<DownloadEvent> {
        let mut last = None;
        while let Some(event) = self.next_event().await {
            last = Some(event);
        }
        last.filter(DownloadEvent::is_terminal)
    }

    fn translate(&mut self, event: SupervisorEvent) -> Option<DownloadEvent> {
        match event {
            SupervisorEvent::Started { .. } => Some(DownloadEvent::Started),
            SupervisorEvent::Sample(sample) => {
                self.aggregator.apply(&sample).map(DownloadEvent::Progress)
            }
            SupervisorEvent::Log(line) => Some(DownloadEvent::Log(line)),
            SupervisorEvent::Completed { path } => self
                .aggregator
                .complete()
                .map(|progress| DownloadEvent::Completed { path, progress }),
            SupervisorEvent::Failed { message, exit_code } => self
                .aggregator
                .fail()
                .then_some(DownloadEvent::Failed { message, exit_code }),
            SupervisorEvent::Cancelled => self.aggregator.cancel().then_some(DownloadEvent::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{Phase, RawProgressSample};

    fn sample(percent: f64, total: u64) -> SupervisorEvent {
        SupervisorEvent::Sample(RawProgressSample {
            percent,
            total_bytes: Some(total),
            rate: None,
            eta: None,
            phase: Phase::Downloading,
        })
    }

    fn session_with(events: Vec<SupervisorEvent>) -> DownloadSession {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in events {
            tx.send(event).unwrap();
        }
        DownloadSession::new(DownloadId::new("s"), rx, ProgressAggregator::new())
    }

    async fn collect(mut session: DownloadSession) -> Vec<DownloadEvent> {
        let mut events = Vec::new();
        while let Some(event) = session.next_event().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_events_are_normalized_in_order() {
        let session = session_with(vec![
            SupervisorEvent::Started { pid: Some(7) },
            SupervisorEvent::Log("[download] ...".into()),
            sample(50.0, 1000),
            SupervisorEvent::Completed {
                path: PathBuf::from("/tmp/a.mp4"),
            },
        ]);

        let events = collect(session).await;
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], DownloadEvent::Started);
        assert!(matches!(events[1], DownloadEvent::Log(_)));
        assert!(matches!(&events[2], DownloadEvent::Progress(p) if p.percent == 50.0));
        match &events[3] {
            DownloadEvent::Completed { path, progress } => {
                assert_eq!(path, &PathBuf::from("/tmp/a.mp4"));
                assert_eq!(progress.percent, 100.0);
                assert_eq!(progress.downloaded_bytes, Some(1000));
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_events_after_terminal_are_discarded() {
        let session = session_with(vec![
            sample(10.0, 1000),
            SupervisorEvent::Cancelled,
            sample(90.0, 1000),
            SupervisorEvent::Log("late".into()),
            SupervisorEvent::Completed {
                path: PathBuf::from("x"),
            },
        ]);

        let events = collect(session).await;
        assert_eq!(events.last(), Some(&DownloadEvent::Cancelled));
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn test_closed_channel_without_outcome_ends_session() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(SupervisorEvent::Started { pid: None }).unwrap();
        drop(tx);

        let mut session = DownloadSession::new(DownloadId::new("s"), rx, ProgressAggregator::new());
        assert_eq!(session.next_event().await, Some(DownloadEvent::Started));
        assert_eq!(session.next_event().await, None);
        assert_eq!(session.status(), ProgressStatus::Active);
    }

    #[tokio::test]
    async fn test_wait_returns_terminal_event() {
        let session = session_with(vec![
            SupervisorEvent::Started { pid: None },
            SupervisorEvent::Failed {
                message: "Process exited with code 1".into(),
                exit_code: Some(1),
            },
        ]);

        assert_eq!(
            session.wait().await,
            Some(DownloadEvent::Failed {
                message: "Process exited with code 1".into(),
                exit_code: Some(1),
            })
        );
    }

    #[tokio::test]
    async fn test_progress_never_regresses_across_subtransfers() {
        let session = session_with(vec![
            sample(95.0, 100),
            sample(1.0, 20),
            sample(50.0, 20),
            SupervisorEvent::Sample(RawProgressSample::merging()),
        ]);

        let percents: Vec<f64> = collect(session)
            .await
            .into_iter()
            .filter_map(|e| match e {
                DownloadEvent::Progress(p) => Some(p.percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents.len(), 4);
        assert!(percents.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(percents[3], 99.9);
    }
}
