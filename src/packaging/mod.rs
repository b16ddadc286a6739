//! Turning fetched images into a single output artifact
//!
//! This module handles the last step of a batch job. It supports two formats:
//! a multi-page PDF (one image per page) and a ZIP archive (one entry per image).
//! Both packagers write through [`write_atomically`](crate::utils::write_atomically),
//! so a failed run never leaves a partial file under the final name.

mod archive;
mod document;


pub use archive::ArchivePackager;
pub use document::DocumentPackager;

use crate::config::PackagingConfig;
use crate::error::PackagingError;
use crate::types::OutputFormat;
use std::path::{Path, PathBuf};

/// One successfully fetched image, stored in the job's temporary directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedItem {
    /// Sequence number the image was fetched for
    pub index: u32,
    /// Base filename derived from the source URL
    pub name: String,
    /// Location of the downloaded bytes
    pub path: PathBuf,
}

/// What a packager produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageSummary {
    /// Final artifact path
    pub path: PathBuf,
    /// Pages or archive entries written
    pub entries: usize,
    /// Artifact size on disk
    pub bytes: u64,
}

/// Bundles an ordered list of images into one file
///
/// Implementations are synchronous; callers run them on the blocking pool.
pub trait Packager: Send + Sync {
    /// Write `items`, in order, to `destination`
    fn package(
        &self,
        items: &[FetchedItem],
        destination: &Path,
    ) -> std::result::Result<PackageSummary, PackagingError>;

    /// Format this packager produces
    fn format(&self) -> OutputFormat;

    /// Message emitted when packaging starts
    fn start_message(&self) -> &'static str {
        match self.format() {
            OutputFormat::Document => "Converting to PDF...",
            OutputFormat::Archive => "Creating ZIP archive...",
        }
    }
}

/// Packager for `format` configured from `config`
pub fn packager_for(format: OutputFormat, config: &PackagingConfig) -> Box<dyn Packager> {
    match format {
        OutputFormat::Document => Box::new(DocumentPackager::new(config.jpeg_quality)),
        OutputFormat::Archive => Box::new(ArchivePackager::new(config.archive_collision)),
    }
}

/// Size of the file at `path`, for the summary
fn artifact_summary(
    path: &Path,
    entries: usize,
) -> std::result::Result<PackageSummary, PackagingError> {
    let bytes = std::fs::metadata(path)
        .map_err(|e| crate::utils::write_error(path, e))?
        .len();
    Ok(PackageSummary {
        path: path.to_path_buf(),
        entries,
        bytes,
    })
}
