//! Per-job progress reporting
//!
//! A [`ProgressReporter`] is the only writer of its job's state. Every call
//! updates the stored [`JobInfo`](crate::types::JobInfo), appends an immutable
//! [`ProgressEvent`] to the job history, wakes the job's followers, and
//! broadcasts the event on the global feed. Once a terminal event has been published
//! further calls are ignored, so a stream never continues past its end.

use crate::registry::{JobEntry, JobState};
use crate::types::{JobId, ProgressEvent, Status};
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Finite stream of one job's events
pub type ProgressStream = BoxStream<'static, ProgressEvent>;

/// Single writer for one job's state and events
#[derive(Clone)]
pub struct ProgressReporter {
    job_id: JobId,
    entry: Arc<JobEntry>,
    global_tx: broadcast::Sender<ProgressEvent>,
}

/// Field changes carried by one event
#[derive(Default)]
struct Update<'a> {
    progress: Option<u32>,
    status: Option<Status>,
    filename: Option<&'a str>,
    index: Option<u32>,
}

impl ProgressReporter {
    pub(crate) fn new(
        job_id: JobId,
        entry: Arc<JobEntry>,
        global_tx: broadcast::Sender<ProgressEvent>,
    ) -> Self {
        Self {
            job_id,
            entry,
            global_tx,
        }
    }

    /// Job this reporter writes to
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Set the expected number of units without emitting an event
    pub async fn set_total(&self, total: u32) {
        self.entry.state.lock().await.info.total = total;
    }

    /// Emit a status message; `None` keeps the previous progress/status
    pub async fn emit(&self, message: &str, progress: Option<u32>, status: Option<Status>) {
        self.publish(
            message,
            Update {
                progress,
                status,
                ..Default::default()
            },
        )
        .await;
    }

    /// Emit the per-item event for sequence number `index`
    pub async fn item(&self, index: u32, progress: u32, message: &str) {
        self.publish(
            message,
            Update {
                progress: Some(progress),
                status: Some(Status::Downloading),
                index: Some(index),
                ..Default::default()
            },
        )
        .await;
    }

    /// Terminal success carrying the produced file name
    pub async fn complete(&self, message: &str, progress: u32, filename: &str) {
        self.publish(
            message,
            Update {
                progress: Some(progress),
                status: Some(Status::Completed),
                filename: Some(filename),
                ..Default::default()
            },
        )
        .await;
    }

    /// Terminal failure
    pub async fn fail(&self, message: &str) {
        self.publish(
            message,
            Update {
                status: Some(Status::Error),
                ..Default::default()
            },
        )
        .await;
    }

    /// Whether a terminal event has been published
    pub async fn is_finished(&self) -> bool {
        self.entry.state.lock().await.info.status.is_terminal()
    }

    async fn publish(&self, message: &str, update: Update<'_>) {
        let mut state = self.entry.state.lock().await;
        if state.info.status.is_terminal() {
            tracing::debug!(job_id = %self.job_id, message, "ignoring event after terminal status");
            return;
        }

        let event = apply(&mut state, self.job_id, message, update);

        // Signalled under the lock so followers always find the event in history
        self.entry.changed.send_replace(state.history.len());
        self.global_tx.send(event).ok();
    }
}

fn apply(state: &mut JobState, job_id: JobId, message: &str, update: Update<'_>) -> ProgressEvent {
    let info = &mut state.info;
    if let Some(progress) = update.progress {
        info.progress = progress;
    }
    if let Some(status) = update.status {
        info.status = status;
    }
    if let Some(filename) = update.filename {
        info.filename = Some(filename.to_string());
    }
    info.message = message.to_string();

    let event = ProgressEvent {
        job_id,
        message: message.to_string(),
        progress: info.progress,
        total: info.total,
        status: info.status,
        timestamp: Utc::now(),
        filename: update.filename.map(str::to_string),
        index: update.index,
    };
    state.history.push(event.clone());
    event
}

/// Cursor over one job's history, woken by the entry's change signal
struct Follower {
    entry: Arc<JobEntry>,
    changed: watch::Receiver<usize>,
    delivered: usize,
    pending: VecDeque<ProgressEvent>,
    done: bool,
}

/// Stream a job's history from the first event, waiting for new ones until the terminal event
///
/// Events are read back from the stored history rather than a bounded
/// channel, so a slow consumer never loses any.
pub(crate) fn follow(entry: Arc<JobEntry>) -> ProgressStream {
    let changed = entry.changed.subscribe();
    let follower = Follower {
        entry,
        changed,
        delivered: 0,
        pending: VecDeque::new(),
        done: false,
    };

    stream::unfold(follower, |mut f| async move {
        loop {
            if let Some(event) = f.pending.pop_front() {
                return Some((event, f));
            }
            if f.done {
                return None;
            }

            // Mark the signal seen before reading, so a publish after the read wakes us
            drop(f.changed.borrow_and_update());
            {
                let state = f.entry.state.lock().await;
                f.pending
                    .extend(state.history[f.delivered..].iter().cloned());
                f.delivered = state.history.len();
                f.done = state.history.last().is_some_and(ProgressEvent::is_terminal);
            }

            if f.pending.is_empty() && f.changed.changed().await.is_err() {
                return None;
            }
        }
    })
    .boxed()
}
