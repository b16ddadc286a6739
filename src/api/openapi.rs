//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the imageseq-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the imageseq-dl REST API
///
/// The OpenAPI document is served at:
/// - `/api/v1/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "imageseq-dl REST API",
        version = "0.1.0",
        description = "Submit single-image and numbered-sequence downloads, follow their progress, and fetch the produced PDF or ZIP files",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000/api/v1", description = "Local development server")
    ),
    paths(
        // Downloads
        crate::api::routes::submit_single_download,
        crate::api::routes::submit_batch_download,

        // Jobs
        crate::api::routes::list_jobs,
        crate::api::routes::get_job,
        crate::api::routes::job_event_stream,

        // Files
        crate::api::routes::download_file,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::JobMode,
        crate::types::Status,
        crate::types::OutputFormat,
        crate::types::ProgressEvent,
        crate::types::JobInfo,
        crate::types::BatchRequest,

        // Config types from config.rs
        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::RetryConfig,
        crate::config::PackagingConfig,
        crate::config::ArchiveCollisionAction,
        crate::config::ServerIntegrationConfig,
        crate::config::ApiConfig,

        // API request/response types from routes
        crate::api::routes::SingleDownloadRequest,
        crate::api::routes::BatchDownloadRequest,
        crate::api::routes::JobCreatedResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "downloads", description = "Submit single-image and batch downloads"),
        (name = "jobs", description = "Job status and per-job progress streams"),
        (name = "files", description = "Retrieve produced images, PDFs, and ZIP archives"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;
