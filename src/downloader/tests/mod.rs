use super::test_helpers::{MockFetcher, create_test_downloader};
use super::*;
use crate::types::{BatchRequest, JobMode, OutputFormat, ProgressEvent, Status};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

mod batch;

/// Collect a job's full event stream
async fn events_of(downloader: &ImageDownloader, id: JobId) -> Vec<ProgressEvent> {
    downloader.subscribe_job(id).await.unwrap().collect().await
}

fn page_urls(count: u32) -> Vec<String> {
    (1..=count)
        .map(|n| format!("https://img.example.com/book/page_{:04}.jpg", n))
        .collect()
}
