//! Error types for imageseq-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (fetching, packaging, validation)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for imageseq-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for imageseq-dl
///
/// Submission-time problems (`Validation`) are returned to the caller directly.
/// Everything else that goes wrong inside a job is reported through that job's
/// progress stream as a terminal `error` event.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "fetch_timeout")
        key: Option<String>,
    },

    /// Malformed or missing input, rejected before any job is created
    #[error("validation error: {0}")]
    Validation(String),

    /// One of the two batch URLs has no numeric run before its extension
    #[error("could not find numeric pattern in URL: {url}")]
    PatternNotFound {
        /// The URL that lacked a usable digit run
        url: String,
    },

    /// Start index greater than end index
    #[error("start number {start} is greater than end number {end}")]
    RangeOrder {
        /// First index of the inferred range
        start: u32,
        /// Last index of the inferred range
        end: u32,
    },

    /// Fetching a single resource failed
    #[error("network error: {0}")]
    Fetch(#[from] FetchError),

    /// Building the output artifact failed
    #[error("packaging error: {0}")]
    Packaging(#[from] PackagingError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Job or artifact not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Shutdown in progress - not accepting new jobs
    #[error("shutdown in progress: not accepting new jobs")]
    ShuttingDown,

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Failure to retrieve a single resource
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed or uses an unsupported scheme
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// The requested URL
        url: String,
        /// The HTTP status code returned
        status: u16,
    },

    /// Request did not complete within the configured timeout
    #[error("timeout fetching {url} (exceeded {seconds} seconds)")]
    Timeout {
        /// The requested URL
        url: String,
        /// The timeout that was exceeded
        seconds: u64,
    },

    /// Could not connect or the transfer was interrupted
    #[error("connection failed for {url}: {reason}")]
    Connection {
        /// The requested URL
        url: String,
        /// Underlying transport error
        reason: String,
    },

    /// Response headers arrived but the body could not be read
    #[error("failed to read response body from {url}: {reason}")]
    Body {
        /// The requested URL
        url: String,
        /// Underlying read error
        reason: String,
    },
}

impl FetchError {
    /// The URL this failure refers to
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Timeout { url, .. }
            | FetchError::Connection { url, .. }
            | FetchError::Body { url, .. } => url,
        }
    }
}

/// Failures while turning fetched images into a single artifact
#[derive(Debug, Error)]
pub enum PackagingError {
    /// Nothing to package
    #[error("no images to package")]
    Empty,

    /// An input image could not be decoded
    #[error("failed to decode image {name}: {reason}")]
    Decode {
        /// Base filename of the image
        name: String,
        /// Decoder error
        reason: String,
    },

    /// An image or the document could not be encoded
    #[error("failed to encode {what}: {reason}")]
    Encode {
        /// What was being encoded (page image, PDF document, ...)
        what: String,
        /// Encoder error
        reason: String,
    },

    /// Two inputs share a base filename and collisions are rejected
    #[error("duplicate archive entry name: {name}")]
    DuplicateEntry {
        /// The colliding entry name
        name: String,
    },

    /// Writing the artifact to disk failed
    #[error("failed to write {path}: {reason}")]
    Write {
        /// Destination (or temporary) path
        path: PathBuf,
        /// Underlying I/O error
        reason: String,
    },
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "validation_error",
///     "message": "validation error: URL must start with http:// or https://"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Validation(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 422 Unprocessable Entity - input understood but unusable
            Error::PatternNotFound { .. } => 422,
            Error::RangeOrder { .. } => 422,
            Error::Packaging(_) => 422,

            // 502 Bad Gateway - remote image host failed
            Error::Fetch(_) => 502,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::PatternNotFound { .. } => "pattern_not_found",
            Error::RangeOrder { .. } => "range_order",
            Error::Fetch(e) => match e {
                FetchError::InvalidUrl { .. } => "invalid_url",
                FetchError::Status { .. } => "http_status",
                FetchError::Timeout { .. } => "timeout",
                FetchError::Connection { .. } => "connection_failed",
                FetchError::Body { .. } => "body_read_failed",
            },
            Error::Packaging(e) => match e {
                PackagingError::Empty => "nothing_to_package",
                PackagingError::Decode { .. } => "decode_failed",
                PackagingError::Encode { .. } => "encode_failed",
                PackagingError::DuplicateEntry { .. } => "duplicate_entry",
                PackagingError::Write { .. } => "write_failed",
            },
            Error::Io(_) => "io_error",
            Error::NotFound(_) => "not_found",
            Error::ShuttingDown => "shutting_down",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();

        // I/O and server internals are logged, not echoed to clients
        let message = match &error {
            Error::Io(_) | Error::ApiServerError(_) | Error::Other(_) => {
                tracing::error!(error = %error, "internal error surfaced to API");
                "internal server error".to_string()
            }
            _ => error.to_string(),
        };

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            Error::PatternNotFound { url } => Some(serde_json::json!({ "url": url })),
            Error::RangeOrder { start, end } => Some(serde_json::json!({
                "start": start,
                "end": end,
            })),
            Error::Fetch(FetchError::Status { url, status }) => Some(serde_json::json!({
                "url": url,
                "status": status,
            })),
            Error::Packaging(PackagingError::DuplicateEntry { name }) => {
                Some(serde_json::json!({ "name": name }))
            }
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
