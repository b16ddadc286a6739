//! Waiting on jobs and shutdown coordination.

use crate::error::{Error, Result};
use crate::types::{JobId, JobInfo};
use futures::StreamExt;
use std::sync::atomic::Ordering;

use super::ImageDownloader;

impl ImageDownloader {
    /// Wait until a job has finished and return its final state
    ///
    /// Any number of callers may wait on the same job; each returns once the
    /// job's terminal event has been published. Returns immediately for jobs
    /// that already finished.
    pub async fn wait(&self, id: JobId) -> Result<JobInfo> {
        let mut events = self.registry.subscribe(id).await?;
        while events.next().await.is_some() {}

        // The first waiter also reaps the supervisor task
        if let Some(handle) = self.registry.take_task(id).await? {
            handle
                .await
                .map_err(|e| Error::Other(format!("job supervisor failed: {}", e)))?;
        }
        self.job(id).await
    }

    /// Gracefully shut down the downloader
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new jobs (submissions fail with [`Error::ShuttingDown`])
    /// 2. Waits for every running job to reach a terminal state
    ///
    /// Jobs are never cancelled; a job stuck on a slow host delays shutdown by
    /// at most its remaining fetch timeouts.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new jobs");

        let jobs = self.registry.ids().await;
        tracing::info!(jobs = jobs.len(), "Waiting for running jobs to finish");

        for id in jobs {
            if let Err(e) = self.wait(id).await {
                tracing::warn!(job_id = %id, error = %e, "Error while waiting for job to finish");
            }
        }

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Whether new submissions are still accepted
    pub fn is_accepting(&self) -> bool {
        self.accepting_new.load(Ordering::SeqCst)
    }
}
