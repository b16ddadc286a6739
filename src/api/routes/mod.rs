//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`downloads`] — Job submission
//! - [`jobs`] — Job status and per-job event streams
//! - [`files`] — Produced file retrieval
//! - [`system`] — Health, events, OpenAPI

use crate::types::JobId;
use serde::{Deserialize, Serialize};

mod downloads;
mod files;
mod jobs;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use downloads::*;
pub use files::*;
pub use jobs::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /downloads/single
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SingleDownloadRequest {
    /// Image URL (http or https)
    #[serde(default)]
    pub url: String,
}

/// Request body for POST /downloads/batch
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct BatchDownloadRequest {
    /// URL of the first image in the sequence
    #[serde(default)]
    pub start_url: String,
    /// URL of the last image in the sequence
    #[serde(default)]
    pub end_url: String,
    /// Output file name; defaults per format, extension appended when missing
    pub output_name: Option<String>,
    /// "document"/"pdf" (default) or "archive"/"zip"
    pub output_format: Option<String>,
}

/// Response for accepted submissions
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct JobCreatedResponse {
    /// Identifier of the new job
    pub job_id: JobId,
}
