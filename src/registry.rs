//! Job registry
//!
//! The registry is owned by the [`ImageDownloader`](crate::ImageDownloader)
//! and shared with every worker and query handler. The map itself is behind a
//! `RwLock` (writes only on submission); each job's state sits behind its own
//! mutex and is written only through that job's [`ProgressReporter`].

use crate::error::{Error, Result};
use crate::progress::{ProgressReporter, ProgressStream, follow};
use crate::types::{JobId, JobInfo, JobMode, ProgressEvent, Status};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, broadcast, watch};
use tokio::task::JoinHandle;

/// Mutable state of one job
pub(crate) struct JobState {
    pub(crate) info: JobInfo,
    /// Every event emitted so far, replayed to late subscribers
    pub(crate) history: Vec<ProgressEvent>,
}

/// One registered job
pub(crate) struct JobEntry {
    pub(crate) state: Mutex<JobState>,
    /// History length, bumped on every publish
    pub(crate) changed: watch::Sender<usize>,
    /// Supervisor task driving the job
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Concurrent map of job id to job state and event channels
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Arc<JobEntry>>>,
    /// Firehose of every job's events
    events_tx: broadcast::Sender<ProgressEvent>,
}

impl JobRegistry {
    /// Create an empty registry; `capacity` bounds the global event channel
    pub fn new(capacity: usize) -> Self {
        let (events_tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            jobs: RwLock::new(HashMap::new()),
            events_tx,
        }
    }

    /// Register a new job in the `ready` state and return its single writer
    pub async fn register(&self, mode: JobMode) -> ProgressReporter {
        let id = JobId::new();
        let (changed, _rx) = watch::channel(0);
        let entry = Arc::new(JobEntry {
            state: Mutex::new(JobState {
                info: JobInfo {
                    id,
                    mode,
                    status: Status::Ready,
                    progress: 0,
                    total: 0,
                    message: String::new(),
                    filename: None,
                    created_at: Utc::now(),
                },
                history: Vec::new(),
            }),
            changed,
            task: Mutex::new(None),
        });

        self.jobs.write().await.insert(id, entry.clone());
        tracing::debug!(job_id = %id, ?mode, "job registered");

        ProgressReporter::new(id, entry, self.events_tx.clone())
    }

    async fn entry(&self, id: JobId) -> Result<Arc<JobEntry>> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("job {}", id)))
    }

    /// Current snapshot of one job
    pub async fn get(&self, id: JobId) -> Option<JobInfo> {
        let entry = self.entry(id).await.ok()?;
        let state = entry.state.lock().await;
        Some(state.info.clone())
    }

    /// Snapshots of every job, oldest first
    pub async fn list(&self) -> Vec<JobInfo> {
        let entries: Vec<Arc<JobEntry>> = self.jobs.read().await.values().cloned().collect();
        let mut infos = Vec::with_capacity(entries.len());
        for entry in entries {
            infos.push(entry.state.lock().await.info.clone());
        }
        infos.sort_by_key(|info| info.created_at);
        infos
    }

    /// Number of registered jobs
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Whether no job was ever registered
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Stream of one job's events: everything so far, then live events,
    /// ending after the terminal event
    pub async fn subscribe(&self, id: JobId) -> Result<ProgressStream> {
        let entry = self.entry(id).await?;
        Ok(follow(entry))
    }

    /// Receiver for every event of every job
    pub fn subscribe_all(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events_tx.subscribe()
    }

    /// Store the task handle driving a job
    pub(crate) async fn attach_task(&self, id: JobId, handle: JoinHandle<()>) -> Result<()> {
        let entry = self.entry(id).await?;
        *entry.task.lock().await = Some(handle);
        Ok(())
    }

    /// Take the task handle of a job, if it has not been awaited yet
    pub(crate) async fn take_task(&self, id: JobId) -> Result<Option<JoinHandle<()>>> {
        let entry = self.entry(id).await?;
        let handle = entry.task.lock().await.take();
        Ok(handle)
    }

    /// Ids of every registered job
    pub(crate) async fn ids(&self) -> Vec<JobId> {
        self.jobs.read().await.keys().copied().collect()
    }
}
