//! Core types for imageseq-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Error;

/// Unique identifier for a job
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Create a fresh random JobId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn get(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for JobId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Whether a job fetches one image or a numbered sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    /// One URL saved as-is into the output directory
    Single,
    /// A numeric URL range bundled into one artifact
    Batch,
}

/// Job status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Registered, worker not yet running
    Ready,
    /// Fetching images
    Downloading,
    /// Building the output artifact
    Converting,
    /// Finished successfully
    Completed,
    /// Finished with a fatal error
    Error,
}

impl Status {
    /// Completed and Error end a job's event stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Error)
    }

    /// Lowercase name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ready => "ready",
            Status::Downloading => "downloading",
            Status::Converting => "converting",
            Status::Completed => "completed",
            Status::Error => "error",
        }
    }
}

/// Packaging applied to a batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Multi-page PDF, one image per page (default)
    #[default]
    Document,
    /// ZIP archive, one entry per image
    Archive,
}

impl OutputFormat {
    /// File extension (without dot) used for artifacts of this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Document => "pdf",
            OutputFormat::Archive => "zip",
        }
    }

    /// Artifact name used when the caller supplies none
    pub fn default_output_name(&self) -> &'static str {
        match self {
            OutputFormat::Document => "downloaded_document.pdf",
            OutputFormat::Archive => "downloaded_images.zip",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Document => write!(f, "document"),
            OutputFormat::Archive => write!(f, "archive"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "document" | "pdf" => Ok(OutputFormat::Document),
            "archive" | "zip" => Ok(OutputFormat::Archive),
            other => Err(Error::Validation(format!(
                "unknown output format '{}': expected 'document' or 'archive'",
                other
            ))),
        }
    }
}

/// One immutable status update for a job
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressEvent {
    /// Job this event belongs to
    pub job_id: JobId,
    /// Human-readable message
    pub message: String,
    /// Units completed so far
    pub progress: u32,
    /// Units expected in total (0 until known)
    pub total: u32,
    /// Job status at the time of the event
    pub status: Status,
    /// When the event was emitted
    pub timestamp: DateTime<Utc>,
    /// Produced file name (terminal `completed` events only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Sequence number of the image this event reports on (per-item batch events only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl ProgressEvent {
    /// Whether this event ends its job's stream
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Snapshot of a job's current state
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JobInfo {
    /// Unique job identifier
    pub id: JobId,
    /// Single image or batch
    pub mode: JobMode,
    /// Current status
    pub status: Status,
    /// Units completed so far
    pub progress: u32,
    /// Units expected in total
    pub total: u32,
    /// Latest progress message
    pub message: String,
    /// Produced file name once completed
    pub filename: Option<String>,
    /// When the job was submitted
    pub created_at: DateTime<Utc>,
}

/// Parameters for a batch job
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct BatchRequest {
    /// URL of the first image in the sequence
    pub start_url: String,
    /// URL of the last image in the sequence
    pub end_url: String,
    /// Artifact file name (defaults per format when empty)
    #[serde(default)]
    pub output_name: Option<String>,
    /// Packaging format
    #[serde(default)]
    pub output_format: OutputFormat,
}
