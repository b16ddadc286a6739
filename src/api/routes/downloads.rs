//! Job submission handlers.

use super::{BatchDownloadRequest, JobCreatedResponse, SingleDownloadRequest};
use crate::api::AppState;
use crate::types::{BatchRequest, OutputFormat};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /downloads/single - Download one image
#[utoipa::path(
    post,
    path = "/api/v1/downloads/single",
    tag = "downloads",
    request_body = SingleDownloadRequest,
    responses(
        (status = 202, description = "Job accepted", body = JobCreatedResponse),
        (status = 400, description = "Missing or non-http(s) URL", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn submit_single_download(
    State(state): State<AppState>,
    Json(request): Json<SingleDownloadRequest>,
) -> Response {
    match state.downloader.submit_single(&request.url).await {
        Ok(job_id) => (StatusCode::ACCEPTED, Json(JobCreatedResponse { job_id })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /downloads/batch - Download a numbered sequence into one file
#[utoipa::path(
    post,
    path = "/api/v1/downloads/batch",
    tag = "downloads",
    request_body = BatchDownloadRequest,
    responses(
        (status = 202, description = "Job accepted", body = JobCreatedResponse),
        (status = 400, description = "Missing URL, unknown format, or invalid output name", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn submit_batch_download(
    State(state): State<AppState>,
    Json(request): Json<BatchDownloadRequest>,
) -> Response {
    let output_format = match request.output_format.as_deref() {
        None => OutputFormat::default(),
        Some(value) => match value.parse::<OutputFormat>() {
            Ok(format) => format,
            Err(e) => return e.into_response(),
        },
    };

    let batch = BatchRequest {
        start_url: request.start_url,
        end_url: request.end_url,
        output_name: request.output_name,
        output_format,
    };

    match state.downloader.submit_batch(batch).await {
        Ok(job_id) => (StatusCode::ACCEPTED, Json(JobCreatedResponse { job_id })).into_response(),
        Err(e) => e.into_response(),
    }
}
