//! Custom test assertions for end-to-end tests

use futures::StreamExt;
use imageseq_dl::{ImageDownloader, JobId, ProgressEvent, Status};
use std::path::Path;
use std::time::Duration;

/// Result of waiting for a job to finish
#[derive(Debug)]
pub enum WaitResult {
    /// Job completed, producing the named file
    Completed(String),
    /// Job failed with the given message
    Failed(String),
    /// Timeout waiting for completion
    Timeout,
    /// Stream ended without a terminal event
    StreamEnded,
}

/// Collect every event of `id` until its terminal one
///
/// Returns `None` on timeout.
pub async fn collect_job_events(
    downloader: &ImageDownloader,
    id: JobId,
    timeout: Duration,
) -> Option<Vec<ProgressEvent>> {
    let stream = downloader
        .subscribe_job(id)
        .await
        .expect("job should be registered");

    tokio::time::timeout(timeout, stream.collect::<Vec<_>>())
        .await
        .ok()
}

/// Wait for a job to reach `completed` or `error`
pub async fn wait_for_completion(
    downloader: &ImageDownloader,
    id: JobId,
    timeout: Duration,
) -> WaitResult {
    let Some(events) = collect_job_events(downloader, id, timeout).await else {
        return WaitResult::Timeout;
    };

    match events.last() {
        Some(event) if event.status == Status::Completed => {
            WaitResult::Completed(event.filename.clone().unwrap_or_default())
        }
        Some(event) if event.status == Status::Error => WaitResult::Failed(event.message.clone()),
        _ => WaitResult::StreamEnded,
    }
}

/// Assert that `path` exists and is a non-empty file
pub fn assert_file_exists(path: &Path) {
    let meta = std::fs::metadata(path)
        .unwrap_or_else(|e| panic!("expected {} to exist: {}", path.display(), e));
    assert!(meta.is_file(), "{} is not a file", path.display());
    assert!(meta.len() > 0, "{} is empty", path.display());
}

/// Assert that the directory holds nothing
pub fn assert_dir_empty(path: &Path) {
    let count = std::fs::read_dir(path)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(count, 0, "{} should be empty", path.display());
}
