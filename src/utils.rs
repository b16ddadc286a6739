//! Utility functions for file names and atomic artifact writes

use crate::error::{Error, PackagingError, Result};
use crate::types::OutputFormat;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Maximum number of suffixes tried when resolving a name collision
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Name prefix of in-flight files written by [`write_atomically`]
pub const PARTIAL_PREFIX: &str = ".partial-";

/// Whether `name` is a bare file name that stays inside its directory
///
/// Rejects empty names, `.`/`..`, path separators, and NUL bytes.
#[must_use]
pub fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Whether `name` belongs to an artifact that is still being written
#[must_use]
pub fn is_partial_name(name: &str) -> bool {
    name.starts_with(PARTIAL_PREFIX)
}

/// Validate a caller-supplied artifact name and give it the format's extension
///
/// An empty or missing name becomes the format's default name.
///
/// # Examples
///
/// ```
/// use imageseq_dl::utils::normalize_output_name;
/// use imageseq_dl::types::OutputFormat;
///
/// assert_eq!(normalize_output_name(Some("comic"), OutputFormat::Document).unwrap(), "comic.pdf");
/// assert_eq!(normalize_output_name(Some("pages.ZIP"), OutputFormat::Archive).unwrap(), "pages.ZIP");
/// assert_eq!(normalize_output_name(None, OutputFormat::Archive).unwrap(), "downloaded_images.zip");
/// assert!(normalize_output_name(Some("../evil.pdf"), OutputFormat::Document).is_err());
/// ```
pub fn normalize_output_name(name: Option<&str>, format: OutputFormat) -> Result<String> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Ok(format.default_output_name().to_string());
    }
    if !is_plain_filename(name) || is_partial_name(name) {
        return Err(Error::Validation(format!(
            "output name '{}' must be a plain file name",
            name
        )));
    }

    let has_extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(format.extension()));

    if has_extension {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.{}", name, format.extension()))
    }
}

/// Pick a name not yet in `taken`, appending ` (1)`, ` (2)`, ... before the extension
///
/// The chosen name is inserted into `taken`.
pub fn unique_name(name: &str, taken: &mut HashSet<String>) -> Result<String> {
    if taken.insert(name.to_string()) {
        return Ok(name.to_string());
    }

    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let extension = path.extension().and_then(|e| e.to_str());

    for i in 1..=MAX_RENAME_ATTEMPTS {
        let candidate = match extension {
            Some(ext) => format!("{} ({}).{}", stem, i, ext),
            None => format!("{} ({})", stem, i),
        };
        if taken.insert(candidate.clone()) {
            return Ok(candidate);
        }
    }

    Err(Error::Packaging(PackagingError::DuplicateEntry {
        name: name.to_string(),
    }))
}

/// Write an artifact so it only ever appears complete under `destination`
///
/// `write` receives a temporary file created next to `destination`. The file
/// is renamed into place only if `write` succeeds; otherwise it is removed.
pub fn write_atomically<F>(destination: &Path, write: F) -> std::result::Result<(), PackagingError>
where
    F: FnOnce(&mut std::fs::File) -> std::result::Result<(), PackagingError>,
{
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::Builder::new()
        .prefix(PARTIAL_PREFIX)
        .tempfile_in(parent)
        .map_err(|e| write_error(parent, e))?;

    write(temp.as_file_mut())?;

    temp.as_file_mut()
        .flush()
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| write_error(temp.path(), e))?;

    temp.persist(destination)
        .map_err(|e| write_error(destination, e.error))?;

    Ok(())
}

/// Map an I/O failure on `path` to a packaging write error
pub(crate) fn write_error(path: &Path, e: std::io::Error) -> PackagingError {
    PackagingError::Write {
        path: PathBuf::from(path),
        reason: e.to_string(),
    }
}
