//! Core downloader implementation split into focused submodules.
//!
//! The `ImageDownloader` struct and its methods are organized by domain:
//! - [`single`] - One-image jobs saved straight into the output directory
//! - [`batch`] - Numbered-range jobs bundled into one artifact
//! - [`tasks`] - Supervised task-per-job spawning
//! - [`lifecycle`] - Waiting on jobs and shutdown coordination

mod batch;
mod lifecycle;
mod single;
mod tasks;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::progress::ProgressStream;
use crate::registry::JobRegistry;
use crate::types::{JobId, JobInfo, ProgressEvent};
use crate::utils::{is_partial_name, is_plain_filename};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct ImageDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Every job submitted during this process's lifetime
    pub(crate) registry: Arc<JobRegistry>,
    /// Byte source used by all jobs
    pub(crate) fetcher: Arc<dyn Fetcher>,
    /// Flag to indicate whether new jobs are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl ImageDownloader {
    /// Create a new ImageDownloader instance
    ///
    /// Validates the configuration, creates the output and temp directories,
    /// and builds the HTTP fetcher.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(config.download.fetch_timeout, &config.download.user_agent)?;
        Self::with_fetcher(config, Arc::new(fetcher)).await
    }

    /// Create an instance driven by a custom [`Fetcher`]
    pub async fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate()?;

        for (what, dir) in [
            ("output", &config.download.output_dir),
            ("temp", &config.download.temp_dir),
        ] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create {} directory '{}': {}", what, dir.display(), e),
                ))
            })?;
        }

        tracing::info!(
            output_dir = %config.download.output_dir.display(),
            fetcher = fetcher.name(),
            "image downloader ready"
        );

        Ok(Self {
            registry: Arc::new(JobRegistry::new(config.download.event_buffer)),
            config: Arc::new(config),
            fetcher,
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Subscribe to every job's events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// A subscriber that falls behind by more than `event_buffer` events
    /// receives a `RecvError::Lagged` error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use imageseq_dl::{ImageDownloader, Config};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = ImageDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             println!("{}: {}", event.job_id, event.message);
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ProgressEvent> {
        self.registry.subscribe_all()
    }

    /// Stream of one job's events, from its first event through its terminal one
    ///
    /// Subscribing after the job finished replays the complete history.
    pub async fn subscribe_job(&self, id: JobId) -> Result<ProgressStream> {
        self.registry.subscribe(id).await
    }

    /// Current state of one job
    pub async fn job(&self, id: JobId) -> Result<JobInfo> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("job {}", id)))
    }

    /// Current state of every job, oldest first
    pub async fn jobs(&self) -> Vec<JobInfo> {
        self.registry.list().await
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Resolve a produced file inside the output directory
    ///
    /// Only bare file names are accepted, so nothing outside the output
    /// directory can be reached. Files still being written are never served.
    pub async fn artifact_path(&self, filename: &str) -> Result<PathBuf> {
        if !is_plain_filename(filename) || is_partial_name(filename) {
            return Err(Error::Validation(format!(
                "'{}' is not a plain file name",
                filename
            )));
        }

        let path = self.config.output_dir().join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(Error::NotFound(format!("file {}", filename))),
        }
    }

    /// Spawn the REST API server in a background task
    ///
    /// Listens on the configured bind address (default: 127.0.0.1:5000).
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }

    /// Refuse work once shutdown has begun
    pub(crate) fn ensure_accepting(&self) -> Result<()> {
        if self.accepting_new.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::ShuttingDown)
        }
    }
}
