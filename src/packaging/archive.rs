use crate::config::ArchiveCollisionAction;
use crate::error::PackagingError;
use crate::types::OutputFormat;
use crate::utils::{unique_name, write_atomically, write_error};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use zip::CompressionMethod;
use zip::write::FileOptions;

use super::{FetchedItem, PackageSummary, Packager, artifact_summary};

/// ZIP packager: one Deflate entry per image, named by its base filename
#[derive(Clone, Copy, Debug, Default)]
pub struct ArchivePackager {
    collision: ArchiveCollisionAction,
}

impl ArchivePackager {
    /// Create a packager resolving duplicate entry names with `collision`
    pub fn new(collision: ArchiveCollisionAction) -> Self {
        Self { collision }
    }

    /// Entry names for `items` in input order, with collisions resolved
    pub fn entry_names(
        &self,
        items: &[FetchedItem],
    ) -> std::result::Result<Vec<String>, PackagingError> {
        let mut taken = HashSet::with_capacity(items.len());
        items
            .iter()
            .map(|item| match self.collision {
                ArchiveCollisionAction::Rename => unique_name(&item.name, &mut taken)
                    .map_err(|_| PackagingError::DuplicateEntry {
                        name: item.name.clone(),
                    }),
                ArchiveCollisionAction::Reject => {
                    if taken.insert(item.name.clone()) {
                        Ok(item.name.clone())
                    } else {
                        Err(PackagingError::DuplicateEntry {
                            name: item.name.clone(),
                        })
                    }
                }
            })
            .collect()
    }
}

impl Packager for ArchivePackager {
    fn package(
        &self,
        items: &[FetchedItem],
        destination: &Path,
    ) -> std::result::Result<PackageSummary, PackagingError> {
        if items.is_empty() {
            return Err(PackagingError::Empty);
        }

        // Resolve names before touching the disk so a rejected collision writes nothing
        let names = self.entry_names(items)?;

        write_atomically(destination, |file| {
            let mut writer = zip::ZipWriter::new(file);
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

            for (item, name) in items.iter().zip(&names) {
                let bytes = std::fs::read(&item.path).map_err(|e| write_error(&item.path, e))?;

                writer
                    .start_file(name.as_str(), options)
                    .map_err(|e| PackagingError::Encode {
                        what: format!("archive entry {}", name),
                        reason: e.to_string(),
                    })?;
                writer
                    .write_all(&bytes)
                    .map_err(|e| write_error(destination, e))?;

                debug!(entry = %name, index = item.index, bytes = bytes.len(), "added archive entry");
            }

            writer.finish().map_err(|e| PackagingError::Encode {
                what: "ZIP archive".to_string(),
                reason: e.to_string(),
            })?;
            Ok(())
        })?;

        artifact_summary(destination, items.len())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Archive
    }
}
