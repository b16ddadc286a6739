//! Supervised task-per-job spawning.

use crate::error::Result;
use crate::progress::ProgressReporter;
use std::future::Future;

use super::ImageDownloader;

impl ImageDownloader {
    /// Run `work` on its own task, watched by a supervisor task
    ///
    /// The supervisor's handle is stored in the registry for
    /// [`wait`](ImageDownloader::wait). If the worker panics, or returns
    /// without publishing a terminal event, the supervisor ends the job with
    /// an `error` event so its stream always terminates.
    pub(crate) async fn spawn_job<F>(&self, reporter: ProgressReporter, work: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let job_id = reporter.job_id();
        let worker = tokio::spawn(work);

        let supervisor = tokio::spawn(async move {
            if let Err(e) = worker.await {
                tracing::error!(job_id = %job_id, error = %e, "job worker crashed");
                reporter.fail("Internal error: job worker crashed").await;
            }

            if !reporter.is_finished().await {
                tracing::error!(job_id = %job_id, "job worker exited without a result");
                reporter.fail("Internal error: job ended without a result").await;
            }
        });

        self.registry.attach_task(job_id, supervisor).await
    }
}
