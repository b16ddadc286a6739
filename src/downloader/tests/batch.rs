use super::*;
use std::io::Read;

fn batch(start: &str, end: &str, format: OutputFormat) -> BatchRequest {
    BatchRequest {
        start_url: start.to_string(),
        end_url: end.to_string(),
        output_name: None,
        output_format: format,
    }
}

#[tokio::test]
async fn archive_batch_skips_failed_item() {
    let urls = page_urls(5);
    let fetcher = Arc::new(MockFetcher::failing(&[urls[2].as_str()]));
    let (downloader, _tmp) = create_test_downloader(fetcher.clone()).await;

    let mut request = batch(&urls[0], &urls[4], OutputFormat::Archive);
    request.output_name = Some("book".into());
    let id = downloader.submit_batch(request).await.unwrap();

    let info = downloader.wait(id).await.unwrap();
    assert_eq!(info.status, Status::Completed);
    assert_eq!(info.filename.as_deref(), Some("book.zip"));
    assert_eq!(fetcher.calls(), urls);

    let path = downloader.artifact_path("book.zip").await.unwrap();
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "page_0001.jpg",
            "page_0002.jpg",
            "page_0004.jpg",
            "page_0005.jpg"
        ]
    );

    let mut first = Vec::new();
    archive
        .by_name("page_0001.jpg")
        .unwrap()
        .read_to_end(&mut first)
        .unwrap();
    assert_eq!(first, super::super::test_helpers::sample_png());
}

#[tokio::test]
async fn batch_event_sequence() {
    let urls = page_urls(5);
    let fetcher = Arc::new(MockFetcher::failing(&[urls[2].as_str()]));
    let (downloader, _tmp) = create_test_downloader(fetcher).await;

    let id = downloader
        .submit_batch(batch(&urls[0], &urls[4], OutputFormat::Archive))
        .await
        .unwrap();
    let events = events_of(&downloader, id).await;

    assert_eq!(events.first().unwrap().message, "Analyzing URLs...");
    assert_eq!(events[1].message, "Downloading 5 pages...");
    assert_eq!(events[1].total, 5);

    let items: Vec<&ProgressEvent> = events.iter().filter(|e| e.index.is_some()).collect();
    let indexes: Vec<u32> = items.iter().map(|e| e.index.unwrap()).collect();
    assert_eq!(indexes, vec![1, 2, 3, 4, 5]);
    let progress: Vec<u32> = items.iter().map(|e| e.progress).collect();
    assert_eq!(progress, vec![1, 2, 3, 4, 5]);
    assert!(items[2].message.starts_with("Failed to download page_0003.jpg (3/5)"));
    assert!(items.iter().all(|e| e.status == Status::Downloading));

    let converting: Vec<&str> = events
        .iter()
        .filter(|e| e.status == Status::Converting)
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        converting,
        vec!["Downloaded 4/5 images", "Creating ZIP archive..."]
    );

    let last = events.last().unwrap();
    assert_eq!(last.status, Status::Completed);
    assert_eq!(last.filename.as_deref(), Some("downloaded_images.zip"));
    assert_eq!(
        events.iter().filter(|e| e.is_terminal()).count(),
        1,
        "exactly one terminal event"
    );
}

#[tokio::test]
async fn document_batch_page_count_matches_successes() {
    let urls = page_urls(4);
    let fetcher = Arc::new(MockFetcher::failing(&[urls[0].as_str()]));
    let (downloader, _tmp) = create_test_downloader(fetcher).await;

    let mut request = batch(&urls[0], &urls[3], OutputFormat::Document);
    request.output_name = Some("scan.pdf".into());
    let id = downloader.submit_batch(request).await.unwrap();

    let info = downloader.wait(id).await.unwrap();
    assert_eq!(info.status, Status::Completed);
    assert_eq!(info.progress, 4);
    assert_eq!(info.total, 4);

    let events = events_of(&downloader, id).await;
    assert!(events.iter().any(|e| e.message == "Converting to PDF..."));
    assert_eq!(events.last().unwrap().message, "PDF created: scan.pdf");

    let path = downloader.artifact_path("scan.pdf").await.unwrap();
    let doc = lopdf::Document::load(path).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[tokio::test]
async fn reversed_range_fails_without_fetching() {
    let fetcher = Arc::new(MockFetcher::default());
    let (downloader, _tmp) = create_test_downloader(fetcher.clone()).await;

    let id = downloader
        .submit_batch(batch(
            "https://img.example.com/p/0010.jpg",
            "https://img.example.com/p/0005.jpg",
            OutputFormat::Document,
        ))
        .await
        .unwrap();

    let info = downloader.wait(id).await.unwrap();
    assert_eq!(info.status, Status::Error);
    assert_eq!(info.message, "Start number should be less than end number");
    assert!(fetcher.calls().is_empty());

    let events = events_of(&downloader, id).await;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.index.is_none()));
}

#[tokio::test]
async fn missing_pattern_fails_without_fetching() {
    let fetcher = Arc::new(MockFetcher::default());
    let (downloader, _tmp) = create_test_downloader(fetcher.clone()).await;

    let id = downloader
        .submit_batch(batch(
            "https://img.example.com/cover.jpg",
            "https://img.example.com/page_0009.jpg",
            OutputFormat::Archive,
        ))
        .await
        .unwrap();

    let info = downloader.wait(id).await.unwrap();
    assert_eq!(info.status, Status::Error);
    assert!(info.message.contains("could not find numeric pattern"));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn all_items_failing_skips_packaging() {
    let urls = page_urls(3);
    let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let fetcher = Arc::new(MockFetcher::failing(&refs));
    let (downloader, tmp) = create_test_downloader(fetcher).await;

    let id = downloader
        .submit_batch(batch(&urls[0], &urls[2], OutputFormat::Archive))
        .await
        .unwrap();

    let info = downloader.wait(id).await.unwrap();
    assert_eq!(info.status, Status::Error);
    assert_eq!(info.message, "No images were downloaded successfully");

    let events = events_of(&downloader, id).await;
    assert_eq!(events.iter().filter(|e| e.index.is_some()).count(), 3);
    assert!(events.iter().all(|e| e.status != Status::Converting));

    let produced = std::fs::read_dir(tmp.path().join("downloads")).unwrap().count();
    assert_eq!(produced, 0);
}

#[tokio::test]
async fn undecodable_image_fails_document_without_artifact() {
    let urls = page_urls(2);
    let mut fetcher = MockFetcher::default();
    fetcher
        .bodies
        .insert(urls[1].clone(), b"<html>404 page</html>".to_vec());
    let (downloader, tmp) = create_test_downloader(Arc::new(fetcher)).await;

    let id = downloader
        .submit_batch(batch(&urls[0], &urls[1], OutputFormat::Document))
        .await
        .unwrap();

    let info = downloader.wait(id).await.unwrap();
    assert_eq!(info.status, Status::Error);
    assert!(info.message.starts_with("Failed to create PDF"));
    assert_eq!(
        std::fs::read_dir(tmp.path().join("downloads")).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let urls = page_urls(2);
    let fetcher = MockFetcher::default();
    fetcher.flaky.lock().unwrap().insert(urls[1].clone());
    let fetcher = Arc::new(fetcher);
    let (downloader, _tmp) = create_test_downloader(fetcher.clone()).await;

    let id = downloader
        .submit_batch(batch(&urls[0], &urls[1], OutputFormat::Archive))
        .await
        .unwrap();

    let info = downloader.wait(id).await.unwrap();
    assert_eq!(info.status, Status::Completed);
    assert_eq!(
        fetcher.calls(),
        vec![urls[0].clone(), urls[1].clone(), urls[1].clone()]
    );
}

#[tokio::test]
async fn temp_directory_is_reclaimed() {
    let urls = page_urls(2);
    let fetcher = Arc::new(MockFetcher::failing(&[urls[1].as_str()]));
    let (downloader, tmp) = create_test_downloader(fetcher).await;

    let id = downloader
        .submit_batch(batch(&urls[0], &urls[1], OutputFormat::Archive))
        .await
        .unwrap();
    downloader.wait(id).await.unwrap();

    assert_eq!(std::fs::read_dir(tmp.path().join("temp")).unwrap().count(), 0);
}

#[tokio::test]
async fn worker_panic_ends_stream_with_error() {
    let urls = page_urls(3);
    let fetcher = MockFetcher {
        panic_on: Some(urls[1].clone()),
        ..Default::default()
    };
    let (downloader, tmp) = create_test_downloader(Arc::new(fetcher)).await;

    let id = downloader
        .submit_batch(batch(&urls[0], &urls[2], OutputFormat::Archive))
        .await
        .unwrap();

    let events = events_of(&downloader, id).await;
    let last = events.last().unwrap();
    assert_eq!(last.status, Status::Error);
    assert!(last.message.contains("crashed"));

    let info = downloader.wait(id).await.unwrap();
    assert_eq!(info.status, Status::Error);
    assert_eq!(std::fs::read_dir(tmp.path().join("temp")).unwrap().count(), 0);
}

#[tokio::test]
async fn batch_requires_both_urls() {
    let (downloader, _tmp) = create_test_downloader(Arc::new(MockFetcher::default())).await;

    let result = downloader
        .submit_batch(batch("https://h/p_0001.jpg", "  ", OutputFormat::Document))
        .await;
    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(downloader.jobs().await.is_empty());
}

#[tokio::test]
async fn batch_rejects_path_in_output_name() {
    let (downloader, _tmp) = create_test_downloader(Arc::new(MockFetcher::default())).await;

    let mut request = batch(
        "https://h/p_0001.jpg",
        "https://h/p_0002.jpg",
        OutputFormat::Document,
    );
    request.output_name = Some("../outside.pdf".into());
    assert!(matches!(
        downloader.submit_batch(request).await,
        Err(Error::Validation(_))
    ));
    assert!(downloader.jobs().await.is_empty());
}

#[tokio::test]
async fn batch_job_is_registered_as_batch_mode() {
    let urls = page_urls(1);
    let (downloader, _tmp) = create_test_downloader(Arc::new(MockFetcher::default())).await;

    let id = downloader
        .submit_batch(batch(&urls[0], &urls[0], OutputFormat::Archive))
        .await
        .unwrap();
    let info = downloader.wait(id).await.unwrap();
    assert_eq!(info.mode, JobMode::Batch);
    assert_eq!(info.status, Status::Completed);
}

#[tokio::test]
async fn subscriber_keeps_every_item_event_with_tiny_buffer() {
    let urls = page_urls(10);
    let tmp = tempfile::tempdir().unwrap();
    let mut config = super::super::test_helpers::test_config(tmp.path());
    config.download.event_buffer = 2;
    let downloader = ImageDownloader::with_fetcher(config, Arc::new(MockFetcher::default()))
        .await
        .unwrap();

    let id = downloader
        .submit_batch(batch(&urls[0], &urls[9], OutputFormat::Archive))
        .await
        .unwrap();
    let stream = downloader.subscribe_job(id).await.unwrap();

    // Nobody polls the stream until the job is over
    downloader.wait(id).await.unwrap();
    let events: Vec<ProgressEvent> = stream.collect().await;

    let indices: Vec<u32> = events.iter().filter_map(|e| e.index).collect();
    assert_eq!(indices, (1..=10).collect::<Vec<_>>());
    assert_eq!(events.last().unwrap().status, Status::Completed);
    assert_eq!(events, events_of(&downloader, id).await);
}
