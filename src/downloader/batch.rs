//! Numbered-range jobs.
//!
//! A batch job infers a [`UrlPattern`] from its two URLs, fetches every index
//! of the range one at a time into a job-scoped temporary directory, and hands
//! the successful items to a [`Packager`]. Individual fetch failures are
//! reported and skipped; only a batch with zero successes, an unusable URL
//! pair, or a packaging failure ends in `error`.

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, filename_from_url};
use crate::packaging::{FetchedItem, Packager, packager_for};
use crate::pattern::UrlPattern;
use crate::progress::ProgressReporter;
use crate::retry::download_with_retry;
use crate::types::{BatchRequest, JobId, JobMode, OutputFormat, Status};
use crate::utils::normalize_output_name;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::ImageDownloader;

impl ImageDownloader {
    /// Download a numbered image sequence and bundle it into one file
    ///
    /// Both URLs must be non-empty and the output name must be a bare file
    /// name; otherwise an [`Error::Validation`] is returned and no job is
    /// created. Pattern and range problems are reported on the job's stream.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use imageseq_dl::{ImageDownloader, Config, BatchRequest, OutputFormat};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = ImageDownloader::new(Config::default()).await?;
    /// let id = downloader
    ///     .submit_batch(BatchRequest {
    ///         start_url: "https://example.com/scans/page_0001.jpg".into(),
    ///         end_url: "https://example.com/scans/page_0120.jpg".into(),
    ///         output_name: Some("chapter-1".into()),
    ///         output_format: OutputFormat::Document,
    ///     })
    ///     .await?;
    /// downloader.wait(id).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_batch(&self, request: BatchRequest) -> Result<JobId> {
        self.ensure_accepting()?;

        let start_url = request.start_url.trim();
        let end_url = request.end_url.trim();
        if start_url.is_empty() || end_url.is_empty() {
            return Err(Error::Validation(
                "Both start and end URLs are required".to_string(),
            ));
        }
        let output_name =
            normalize_output_name(request.output_name.as_deref(), request.output_format)?;

        let reporter = self.registry.register(JobMode::Batch).await;
        let job_id = reporter.job_id();
        info!(
            job_id = %job_id,
            start_url,
            end_url,
            output = %output_name,
            format = %request.output_format,
            "batch download submitted"
        );

        let job = BatchJob {
            fetcher: self.fetcher.clone(),
            packager: Arc::from(packager_for(request.output_format, &self.config.packaging)),
            retry: self.config.retry.clone(),
            output_dir: self.config.output_dir().clone(),
            temp_dir: self.config.download.temp_dir.clone(),
            start_url: start_url.to_string(),
            end_url: end_url.to_string(),
            output_name,
        };
        self.spawn_job(reporter.clone(), job.run(reporter)).await?;

        Ok(job_id)
    }
}

/// Everything a batch worker needs, owned so it can move onto its task
struct BatchJob {
    fetcher: Arc<dyn Fetcher>,
    packager: Arc<dyn Packager>,
    retry: RetryConfig,
    output_dir: PathBuf,
    temp_dir: PathBuf,
    start_url: String,
    end_url: String,
    output_name: String,
}

impl BatchJob {
    async fn run(self, reporter: ProgressReporter) {
        let job_id = reporter.job_id();
        reporter
            .emit("Analyzing URLs...", Some(0), Some(Status::Downloading))
            .await;

        let pattern = match UrlPattern::extract(&self.start_url, &self.end_url) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "no numeric pattern in batch URLs");
                reporter.fail(&format!("Batch download failed: {}", e)).await;
                return;
            }
        };
        if let Err(e) = pattern.ensure_ascending() {
            warn!(job_id = %job_id, error = %e, "reversed batch range");
            reporter
                .fail("Start number should be less than end number")
                .await;
            return;
        }

        let total = pattern.len();
        debug!(job_id = %job_id, template = %pattern.template(), total, "inferred URL pattern");
        reporter.set_total(total).await;
        reporter
            .emit(
                &format!("Downloading {} pages...", total),
                Some(0),
                Some(Status::Downloading),
            )
            .await;

        // Removed on drop, including on early return
        let workdir = match tempfile::Builder::new()
            .prefix("imageseq-")
            .tempdir_in(&self.temp_dir)
        {
            Ok(dir) => dir,
            Err(e) => {
                error!(job_id = %job_id, error = %e, "failed to create job temp directory");
                reporter
                    .fail(&format!("Batch download failed: {}", Error::Io(e)))
                    .await;
                return;
            }
        };

        let items = self.fetch_all(&pattern, workdir.path(), &reporter).await;
        if items.is_empty() {
            drop(workdir);
            error!(job_id = %job_id, total, "every item in the batch failed");
            reporter
                .fail("No images were downloaded successfully")
                .await;
            return;
        }

        reporter
            .emit(
                &format!("Downloaded {}/{} images", items.len(), total),
                Some(total),
                Some(Status::Converting),
            )
            .await;
        reporter
            .emit(
                self.packager.start_message(),
                Some(total),
                Some(Status::Converting),
            )
            .await;

        let label = format_label(self.packager.format());
        let packaged = self.package(items).await;
        // Staged images are gone before anyone hears the outcome
        drop(workdir);

        match packaged {
            Ok(()) => {
                reporter
                    .complete(
                        &format!("{} created: {}", label, self.output_name),
                        total,
                        &self.output_name,
                    )
                    .await;
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "packaging failed");
                reporter
                    .fail(&format!("Failed to create {}: {}", label, e))
                    .await;
            }
        }
    }

    /// Fetch every index in order, one per-item event each, keeping the successes
    async fn fetch_all(
        &self,
        pattern: &UrlPattern,
        workdir: &Path,
        reporter: &ProgressReporter,
    ) -> Vec<FetchedItem> {
        let job_id = reporter.job_id();
        let total = pattern.len();
        let mut items = Vec::new();

        for (processed, (index, url)) in (1u32..).zip(pattern.iter()) {
            match self.fetch_one(index, &url, workdir).await {
                Ok(item) => {
                    debug!(job_id = %job_id, index, url = %url, "fetched batch item");
                    reporter
                        .item(
                            index,
                            processed,
                            &format!("Downloaded {} ({}/{})", item.name, processed, total),
                        )
                        .await;
                    items.push(item);
                }
                Err(e) => {
                    warn!(job_id = %job_id, index, url = %url, error = %e, "skipping failed batch item");
                    reporter
                        .item(
                            index,
                            processed,
                            &format!(
                                "Failed to download {} ({}/{}): {}",
                                filename_from_url(&url),
                                processed,
                                total,
                                e
                            ),
                        )
                        .await;
                }
            }
        }

        items
    }

    async fn fetch_one(&self, index: u32, url: &str, workdir: &Path) -> Result<FetchedItem> {
        let resource = download_with_retry(&self.retry, || self.fetcher.fetch(url)).await?;

        // Sequence prefix keeps repeated base names apart on disk
        let path = workdir.join(format!("{:04}_{}", index, resource.filename));
        tokio::fs::write(&path, &resource.bytes).await?;

        Ok(FetchedItem {
            index,
            name: resource.filename,
            path,
        })
    }

    async fn package(&self, items: Vec<FetchedItem>) -> Result<()> {
        let destination = self.output_dir.join(&self.output_name);
        if tokio::fs::try_exists(&destination).await.unwrap_or(false) {
            info!(file = %self.output_name, "overwriting existing artifact");
        }

        let packager = self.packager.clone();
        let summary = tokio::task::spawn_blocking(move || packager.package(&items, &destination))
            .await
            .map_err(|e| Error::Other(format!("packaging task failed: {}", e)))??;

        info!(
            path = %summary.path.display(),
            entries = summary.entries,
            bytes = summary.bytes,
            "artifact written"
        );
        Ok(())
    }
}

fn format_label(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Document => "PDF",
        OutputFormat::Archive => "ZIP archive",
    }
}
