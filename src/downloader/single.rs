//! One-image jobs.

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, validate_http_url};
use crate::progress::ProgressReporter;
use crate::retry::download_with_retry;
use crate::types::{JobId, JobMode, Status};
use crate::utils::{write_atomically, write_error};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use super::ImageDownloader;

impl ImageDownloader {
    /// Download one image into the output directory
    ///
    /// The URL must be non-empty and use `http` or `https`; otherwise an
    /// [`Error::Validation`] is returned and no job is created. On success the
    /// job id is returned immediately and the download runs in the background.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use imageseq_dl::{ImageDownloader, Config};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = ImageDownloader::new(Config::default()).await?;
    /// let id = downloader.submit_single("https://example.com/cover.jpg").await?;
    /// downloader.wait(id).await?;
    /// println!("{:?}", downloader.job(id).await?.filename);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_single(&self, url: &str) -> Result<JobId> {
        self.ensure_accepting()?;

        let url = url.trim();
        if url.is_empty() {
            return Err(Error::Validation("URL is required".to_string()));
        }
        validate_http_url(url).map_err(|_| {
            Error::Validation("URL must start with http:// or https://".to_string())
        })?;

        let reporter = self.registry.register(JobMode::Single).await;
        let job_id = reporter.job_id();
        tracing::info!(job_id = %job_id, url = %url, "single download submitted");

        let job = SingleJob {
            fetcher: self.fetcher.clone(),
            retry: self.config.retry.clone(),
            output_dir: self.config.output_dir().clone(),
            url: url.to_string(),
        };
        self.spawn_job(reporter.clone(), job.run(reporter)).await?;

        Ok(job_id)
    }
}

/// Everything a single-image worker needs, owned so it can move onto its task
struct SingleJob {
    fetcher: Arc<dyn Fetcher>,
    retry: RetryConfig,
    output_dir: PathBuf,
    url: String,
}

impl SingleJob {
    async fn run(self, reporter: ProgressReporter) {
        let job_id = reporter.job_id();
        reporter.set_total(1).await;
        reporter
            .emit("Starting download...", Some(0), Some(Status::Downloading))
            .await;

        let fetched = download_with_retry(&self.retry, || self.fetcher.fetch(&self.url)).await;
        let resource = match fetched {
            Ok(resource) => resource,
            Err(e) => {
                tracing::error!(job_id = %job_id, url = %self.url, error = %e, "single download failed");
                reporter.fail(&format!("Download failed: {}", e)).await;
                return;
            }
        };

        let filename = resource.filename.clone();
        let destination = self.output_dir.join(&filename);
        if tokio::fs::try_exists(&destination).await.unwrap_or(false) {
            tracing::info!(job_id = %job_id, file = %filename, "overwriting existing file");
        }

        match save(destination, resource.bytes).await {
            Ok(()) => {
                tracing::info!(job_id = %job_id, file = %filename, "image saved");
                reporter
                    .complete(&format!("Image saved: {}", filename), 1, &filename)
                    .await;
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, file = %filename, error = %e, "failed to save image");
                reporter.fail(&format!("Download failed: {}", e)).await;
            }
        }
    }
}

/// Write downloaded bytes under their final name on the blocking pool
async fn save(destination: PathBuf, bytes: Vec<u8>) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        write_atomically(&destination, |file| {
            file.write_all(&bytes)
                .map_err(|e| write_error(&destination, e))
        })
    })
    .await
    .map_err(|e| Error::Other(format!("save task failed: {}", e)))?
    .map_err(Error::from)
}
