//! # imageseq-dl
//!
//! Library for downloading numbered image sequences.
//!
//! Give it the first and last URL of a sequence such as
//! `https://example.com/scans/page_0001.jpg` .. `page_0120.jpg` and it infers
//! the numeric range, fetches every image in order, and bundles the ones that
//! arrived into a single PDF or ZIP. Single images can be fetched too. Every
//! job reports progress as a finite stream of [`ProgressEvent`]s.
//!
//! ## Quick Start
//!
//! ```no_run
//! use futures::StreamExt;
//! use imageseq_dl::{BatchRequest, Config, ImageDownloader, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ImageDownloader::new(Config::default()).await?;
//!
//!     let id = downloader
//!         .submit_batch(BatchRequest {
//!             start_url: "https://example.com/scans/page_0001.jpg".into(),
//!             end_url: "https://example.com/scans/page_0010.jpg".into(),
//!             output_name: Some("chapter-1".into()),
//!             output_format: OutputFormat::Document,
//!         })
//!         .await?;
//!
//!     let mut events = downloader.subscribe_job(id).await?;
//!     while let Some(event) = events.next().await {
//!         println!("[{:?}] {}/{} {}", event.status, event.progress, event.total, event.message);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Single-resource retrieval
pub mod fetcher;
/// PDF and ZIP packaging
pub mod packaging;
/// Numeric URL pattern inference
pub mod pattern;
/// Per-job progress reporting
pub mod progress;
/// Job registry
pub mod registry;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{ArchiveCollisionAction, Config};
pub use downloader::ImageDownloader;
pub use error::{
    ApiError, Error, ErrorDetail, FetchError, PackagingError, Result, ToHttpStatus,
};
pub use fetcher::{FetchedResource, Fetcher, HttpFetcher};
pub use packaging::{ArchivePackager, DocumentPackager, FetchedItem, PackageSummary, Packager};
pub use pattern::UrlPattern;
pub use progress::{ProgressReporter, ProgressStream};
pub use types::{BatchRequest, JobId, JobInfo, JobMode, OutputFormat, ProgressEvent, Status};

/// Helper function to run the downloader with graceful signal handling.
///
/// Waits for a termination signal and then calls the downloader's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use imageseq_dl::{ImageDownloader, Config, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::default();
///     let downloader = ImageDownloader::new(config).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: ImageDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
