//! Test configuration helpers for creating downloaders rooted in a temp dir

use imageseq_dl::config::RetryConfig;
use imageseq_dl::{Config, ImageDownloader};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Config writing into `temp_dir`, with short timeouts and fast retries
pub fn test_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.download.output_dir = temp_dir.path().join("downloads");
    config.download.temp_dir = temp_dir.path().join("temp");
    config.download.fetch_timeout = Duration::from_secs(5);
    config.retry = RetryConfig {
        max_attempts: 3,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        jitter: false,
    };
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    config
}

/// Downloader using the real HTTP fetcher
pub async fn create_test_downloader() -> (Arc<ImageDownloader>, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let downloader = ImageDownloader::new(test_config(&temp_dir))
        .await
        .expect("Failed to create downloader");
    (Arc::new(downloader), temp_dir)
}

/// Same as [`create_test_downloader`], with `adjust` applied to the config first
pub async fn create_test_downloader_with(
    adjust: impl FnOnce(&mut Config),
) -> (Arc<ImageDownloader>, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = test_config(&temp_dir);
    adjust(&mut config);
    let downloader = ImageDownloader::new(config)
        .await
        .expect("Failed to create downloader");
    (Arc::new(downloader), temp_dir)
}
