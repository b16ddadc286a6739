//! Produced file retrieval.

use crate::api::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

fn content_type_for(filename: &str) -> &'static str {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn attachment_header(filename: &str) -> HeaderValue {
    let safe: String = filename
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// GET /files/:filename - Download a produced file
#[utoipa::path(
    get,
    path = "/api/v1/files/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Name of a file in the output directory")
    ),
    responses(
        (status = 200, description = "File contents as an attachment", content_type = "application/octet-stream"),
        (status = 400, description = "Not a plain file name", body = crate::error::ApiError),
        (status = 404, description = "File not found", body = crate::error::ApiError)
    )
)]
pub async fn download_file(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    let path = match state.downloader.artifact_path(&filename).await {
        Ok(path) => path,
        Err(e) => return e.into_response(),
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(file = %filename, error = %e, "failed to open artifact");
            return crate::error::Error::NotFound(format!("file {}", filename)).into_response();
        }
    };

    let body = Body::from_stream(ReaderStream::new(file));
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(content_type_for(&filename)),
            ),
            (header::CONTENT_DISPOSITION, attachment_header(&filename)),
        ],
        body,
    )
        .into_response()
}
