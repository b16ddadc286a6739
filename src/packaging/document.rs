use crate::error::PackagingError;
use crate::types::OutputFormat;
use crate::utils::{write_atomically, write_error};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::path::Path;
use tracing::debug;

use super::{FetchedItem, PackageSummary, Packager, artifact_summary};

/// PDF packager: each image becomes one page sized to the image
#[derive(Clone, Copy, Debug)]
pub struct DocumentPackager {
    jpeg_quality: u8,
}

impl DocumentPackager {
    /// Create a packager re-encoding pages at `jpeg_quality` (1-100)
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Decode one image and normalise it to 8-bit RGB
    fn decode(item: &FetchedItem) -> std::result::Result<RgbImage, PackagingError> {
        let bytes = std::fs::read(&item.path).map_err(|e| write_error(&item.path, e))?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| PackagingError::Decode {
            name: item.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(decoded.to_rgb8())
    }

    fn encode_jpeg(&self, name: &str, rgb: &RgbImage) -> std::result::Result<Vec<u8>, PackagingError> {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality)
            .encode_image(rgb)
            .map_err(|e| PackagingError::Encode {
                what: format!("page image {}", name),
                reason: e.to_string(),
            })?;
        Ok(jpeg)
    }

    /// Build the whole document in memory
    fn build(&self, items: &[FetchedItem]) -> std::result::Result<Document, PackagingError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(items.len());

        for item in items {
            let rgb = Self::decode(item)?;
            let (width, height) = (i64::from(rgb.width()), i64::from(rgb.height()));
            let jpeg = self.encode_jpeg(&item.name, &rgb)?;

            let image_id = doc.add_object(
                Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => width,
                        "Height" => height,
                        "ColorSpace" => "DeviceRGB",
                        "BitsPerComponent" => 8,
                        "Filter" => "DCTDecode",
                    },
                    jpeg,
                )
                .with_compression(false),
            );

            // Scale the unit square to the page and paint the image over it
            let content = format!("q {} 0 0 {} 0 0 cm /Im0 Do Q", width, height);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

            let page_id = add_page(&mut doc, pages_id, content_id, image_id, width, height);
            kids.push(page_id.into());

            debug!(page = %item.name, index = item.index, width, height, "added document page");
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }
}

impl Default for DocumentPackager {
    fn default() -> Self {
        Self::new(90)
    }
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    content_id: ObjectId,
    image_id: ObjectId,
    width: i64,
    height: i64,
) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    })
}

impl Packager for DocumentPackager {
    fn package(
        &self,
        items: &[FetchedItem],
        destination: &Path,
    ) -> std::result::Result<PackageSummary, PackagingError> {
        if items.is_empty() {
            return Err(PackagingError::Empty);
        }

        // Every page is decoded before the destination is touched
        let mut doc = self.build(items)?;

        write_atomically(destination, |file| {
            doc.save_to(file).map_err(|e| PackagingError::Encode {
                what: "PDF document".to_string(),
                reason: e.to_string(),
            })
        })?;

        artifact_summary(destination, items.len())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Document
    }
}
