//! REST API server example
//!
//! Runs imageseq-dl with the REST API enabled.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:5000/swagger-ui
//! - Submit a batch via POST http://localhost:5000/downloads/batch
//! - Follow one job via GET http://localhost:5000/jobs/{id}/events
//! - Fetch the result via GET http://localhost:5000/files/{filename}

use imageseq_dl::config::{ApiConfig, Config, DownloadConfig, ServerIntegrationConfig};
use imageseq_dl::{ImageDownloader, run_with_shutdown};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,imageseq_dl=debug")),
        )
        .init();

    let api_config = ApiConfig {
        bind_address: "127.0.0.1:5000".parse::<SocketAddr>()?,
        cors_enabled: true,
        cors_origins: vec!["*".to_string()],
        swagger_ui: true,
    };

    let config = Config {
        download: DownloadConfig {
            output_dir: "downloads".into(),
            temp_dir: "temp".into(),
            ..Default::default()
        },
        server: ServerIntegrationConfig { api: api_config },
        ..Default::default()
    };

    let downloader = Arc::new(ImageDownloader::new(config).await?);

    println!("imageseq-dl REST API on http://localhost:5000");
    println!("Swagger UI: http://localhost:5000/swagger-ui");
    println!();
    println!("Example commands:");
    println!("  curl -X POST http://localhost:5000/downloads/batch \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!(
        "    -d '{{\"start_url\": \"https://example.com/scans/page_001.jpg\", \"end_url\": \"https://example.com/scans/page_040.jpg\", \"output_name\": \"scans\", \"output_format\": \"document\"}}'"
    );
    println!("  curl -N http://localhost:5000/jobs/<job_id>/events");
    println!("  curl -OJ http://localhost:5000/files/scans.pdf");

    let server = downloader.spawn_api_server();

    // Stop accepting jobs on Ctrl+C / SIGTERM, let running ones finish, then exit
    run_with_shutdown((*downloader).clone()).await?;
    server.abort();

    Ok(())
}
