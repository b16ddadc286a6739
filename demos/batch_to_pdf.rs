//! Batch download example
//!
//! Downloads a numbered image sequence into a single PDF without the REST API,
//! printing each progress event as it arrives.
//!
//! ```bash
//! cargo run --example batch_to_pdf -- \
//!     https://example.com/scans/page_001.jpg \
//!     https://example.com/scans/page_040.jpg \
//!     scans
//! ```

use futures::StreamExt;
use imageseq_dl::{BatchRequest, Config, ImageDownloader, OutputFormat, Status};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(start_url), Some(end_url)) = (args.next(), args.next()) else {
        eprintln!("usage: batch_to_pdf <start_url> <end_url> [output_name]");
        std::process::exit(2);
    };
    let output_name = args.next();

    let downloader = ImageDownloader::new(Config::default()).await?;
    let id = downloader
        .submit_batch(BatchRequest {
            start_url,
            end_url,
            output_name,
            output_format: OutputFormat::Document,
        })
        .await?;

    let mut events = downloader.subscribe_job(id).await?;
    while let Some(event) = events.next().await {
        match event.status {
            Status::Completed => {
                println!("done: {}", event.message);
                if let Some(filename) = &event.filename {
                    println!(
                        "saved to {}",
                        downloader.get_config().output_dir().join(filename).display()
                    );
                }
            }
            Status::Error => {
                eprintln!("failed: {}", event.message);
                std::process::exit(1);
            }
            _ => println!("[{}/{}] {}", event.progress, event.total, event.message),
        }
    }

    Ok(())
}
