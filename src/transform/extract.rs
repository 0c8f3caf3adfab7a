//! Plain-text extraction.

use super::{ErrorMode, TextOptions};
use crate::cleanup::CleanupPipeline;
use crate::error::Result;
use crate::model::{PageContent, PageDocument};

/// Separator placed between the text of consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Extract the text of every page, in page order.
///
/// Pages without text, raster pages included, are left out. In
/// [`ErrorMode::Lenient`] a page whose text cannot be read is logged and
/// skipped; in [`ErrorMode::Strict`] it fails the extraction.
pub fn extract_text(doc: &PageDocument, options: &TextOptions) -> Result<String> {
    let pipeline = options.cleanup.clone().map(CleanupPipeline::new).transpose()?;

    let mut texts = Vec::with_capacity(doc.pages.len());
    for (index, page) in doc.iter().enumerate() {
        let number = index + 1;
        let text = match &page.content {
            PageContent::Vector(vp) => match vp.extract_text() {
                Ok(text) => text,
                Err(e) if options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping text of page {}: {}", number, e);
                    continue;
                }
                Err(e) => return Err(e),
            },
            PageContent::Raster(_) => {
                log::debug!("Page {} is an image, no text", number);
                continue;
            }
        };

        let text = text.trim();
        if !text.is_empty() {
            texts.push(text.to_string());
        }
    }

    let joined = texts.join(PAGE_SEPARATOR);
    log::info!(
        "Extracted {} characters from {} of {} pages",
        joined.chars().count(),
        texts.len(),
        doc.page_count()
    );

    Ok(match pipeline {
        Some(pipeline) => pipeline.process(&joined),
        None => joined,
    })
}
