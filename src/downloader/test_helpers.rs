//! Shared test helpers for creating ImageDownloader instances in tests.

use crate::config::{Config, RetryConfig};
use crate::downloader::ImageDownloader;
use crate::error::FetchError;
use crate::fetcher::{FetchedResource, Fetcher, filename_from_url};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

/// Config rooted in a fresh temp dir, with fast retries
pub(crate) fn test_config(root: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.download.output_dir = root.join("downloads");
    config.download.temp_dir = root.join("temp");
    config.retry = RetryConfig {
        max_attempts: 2,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        backoff_multiplier: 2.0,
        jitter: false,
    };
    config
}

/// Helper to create a test ImageDownloader driven by `fetcher`.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader(
    fetcher: Arc<dyn Fetcher>,
) -> (ImageDownloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(temp_dir.path());
    let downloader = ImageDownloader::with_fetcher(config, fetcher).await.unwrap();
    (downloader, temp_dir)
}

/// Small valid PNG
pub(crate) fn sample_png() -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 4, image::Rgb([10, 120, 200])))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// In-memory fetcher that records every requested URL
///
/// URLs listed in `failing` answer 404; URLs in `flaky` answer 503 once, then
/// succeed; everything else returns the configured body (or a sample PNG),
/// after `delay` when set.
#[derive(Default)]
pub(crate) struct MockFetcher {
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) failing: HashSet<String>,
    pub(crate) flaky: Mutex<HashSet<String>>,
    pub(crate) bodies: HashMap<String, Vec<u8>>,
    pub(crate) panic_on: Option<String>,
    /// Sleep before answering each request
    pub(crate) delay: Option<Duration>,
}

impl MockFetcher {
    pub(crate) fn failing(urls: &[&str]) -> Self {
        Self {
            failing: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.panic_on.as_deref() == Some(url) {
            panic!("mock fetcher asked to panic on {url}");
        }
        if self.failing.contains(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            });
        }
        if self.flaky.lock().unwrap().remove(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            });
        }

        Ok(FetchedResource {
            url: url.to_string(),
            filename: filename_from_url(url),
            bytes: self
                .bodies
                .get(url)
                .cloned()
                .unwrap_or_else(sample_png),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
