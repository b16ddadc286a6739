use super::*;
use crate::downloader::test_helpers::{self, MockFetcher};
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Duration;
use tower::ServiceExt;


/// Helper to create a test ImageDownloader backed by an in-memory fetcher
async fn create_test_downloader() -> (Arc<ImageDownloader>, tempfile::TempDir) {
    create_test_downloader_with(MockFetcher::default()).await
}

async fn create_test_downloader_with(
    fetcher: MockFetcher,
) -> (Arc<ImageDownloader>, tempfile::TempDir) {
    let (downloader, temp_dir) = test_helpers::create_test_downloader(Arc::new(fetcher)).await;
    (Arc::new(downloader), temp_dir)
}

fn router_for(downloader: &Arc<ImageDownloader>) -> Router {
    create_router(downloader.clone(), downloader.config.clone())
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let mut config = (*downloader.config).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let downloader = downloader.clone();
        let config = config.clone();
        async move { start_api_server(downloader, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");
    api_handle.abort();
}

#[tokio::test]
async fn test_spawn_api_server_method() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = test_helpers::test_config(temp_dir.path());
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let downloader = Arc::new(
        ImageDownloader::with_fetcher(config, Arc::new(MockFetcher::default()))
            .await
            .unwrap(),
    );

    let api_handle = downloader.spawn_api_server();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished());
    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let mut config = (*downloader.config).clone();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["*".to_string()];
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let mut config = (*downloader.config).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let mut config = (*downloader.config).clone();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["http://allowed.example".to_string()];
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://allowed.example"
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let (downloader, _temp_dir) = create_test_downloader().await;
    let app = router_for(&downloader);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["accepting_jobs"], true);
}

#[tokio::test]
async fn test_health_reports_shutdown() {
    let (downloader, _temp_dir) = create_test_downloader().await;
    downloader.shutdown().await.unwrap();

    let response = router_for(&downloader).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["accepting_jobs"], false);
}

#[tokio::test]
async fn test_server_starts_and_responds_to_health() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = router_for(&downloader);
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/health", addr))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["status"], "ok");

    server_handle.abort();
}

#[tokio::test]
async fn test_openapi_json_endpoint() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let response = router_for(&downloader)
        .oneshot(get("/openapi.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["openapi"].as_str().unwrap().starts_with("3."));
    assert_eq!(json["info"]["title"], "imageseq-dl REST API");

    let paths = json["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/v1/downloads/batch"));
    assert!(paths.contains_key("/api/v1/jobs/{id}/events"));
}

#[tokio::test]
async fn test_swagger_ui_enabled() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let mut config = (*downloader.config).clone();
    config.server.api.swagger_ui = true;
    let app = create_router(downloader, Arc::new(config));

    let response = app.oneshot(get("/swagger-ui/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("swagger"));
}

#[tokio::test]
async fn test_swagger_ui_disabled() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let mut config = (*downloader.config).clone();
    config.server.api.swagger_ui = false;
    let app = create_router(downloader, Arc::new(config));

    let response = app.oneshot(get("/swagger-ui/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let response = router_for(&downloader)
        .oneshot(get("/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
