//! Job status handlers.

use crate::api::AppState;
use crate::error::Error;
use crate::types::{JobId, ProgressEvent};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
};
use futures::StreamExt;
use std::convert::Infallible;

fn parse_job_id(id: &str) -> Result<JobId, Error> {
    id.parse()
        .map_err(|_| Error::Validation(format!("'{}' is not a valid job id", id)))
}

/// Serialize one progress event as an SSE frame named after its status
pub(crate) fn to_sse(event: &ProgressEvent) -> Option<SseEvent> {
    match serde_json::to_string(event) {
        Ok(json_data) => Some(SseEvent::default().event(event.status.as_str()).data(json_data)),
        Err(e) => {
            tracing::warn!("Failed to serialize event to JSON: {}", e);
            None
        }
    }
}

/// GET /jobs - List all jobs
#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    tag = "jobs",
    responses(
        (status = 200, description = "All jobs, oldest first", body = Vec<crate::types::JobInfo>)
    )
)]
pub async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.downloader.jobs().await))
}

/// GET /jobs/:id - Get single job
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(
        ("id" = String, Path, description = "Job ID (UUID)")
    ),
    responses(
        (status = 200, description = "Job state", body = crate::types::JobInfo),
        (status = 400, description = "Malformed job ID", body = crate::error::ApiError),
        (status = 404, description = "Job not found", body = crate::error::ApiError)
    )
)]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = match parse_job_id(&id) {
        Ok(id) => state.downloader.job(id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /jobs/:id/events - Server-sent events for one job
///
/// Replays every event so far, then follows the job live. The stream closes
/// after the job's `completed` or `error` event.
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}/events",
    tag = "jobs",
    params(
        ("id" = String, Path, description = "Job ID (UUID)")
    ),
    responses(
        (status = 200, description = "Server-sent events stream (text/event-stream)", content_type = "text/event-stream"),
        (status = 400, description = "Malformed job ID", body = crate::error::ApiError),
        (status = 404, description = "Job not found", body = crate::error::ApiError)
    )
)]
pub async fn job_event_stream(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let stream = match parse_job_id(&id) {
        Ok(id) => state.downloader.subscribe_job(id).await,
        Err(e) => Err(e),
    };

    match stream {
        Ok(events) => {
            let sse_stream = events.filter_map(|event| async move {
                to_sse(&event).map(Ok::<_, Infallible>)
            });
            Sse::new(sse_stream)
                .keep_alive(KeepAlive::default())
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}
