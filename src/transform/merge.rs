//! Concatenate documents.

use crate::error::{Error, Result};
use crate::model::{Metadata, PageDocument};

/// Minimum number of documents a merge takes.
pub const MIN_MERGE_INPUTS: usize = 2;

/// Concatenate documents in order.
///
/// The result holds every page of the first document, then every page of
/// the second, and so on. Pages keep their dimensions, rotation and
/// content. Metadata starts from the first document's, with the page count
/// updated.
pub fn merge(docs: Vec<PageDocument>) -> Result<PageDocument> {
    if docs.len() < MIN_MERGE_INPUTS {
        return Err(Error::NotEnoughInputs {
            required: MIN_MERGE_INPUTS,
            actual: docs.len(),
        });
    }

    let total: usize = docs.iter().map(|d| d.pages.len()).sum();
    let mut pages = Vec::with_capacity(total);
    let mut metadata: Option<Metadata> = None;

    for (index, doc) in docs.into_iter().enumerate() {
        log::debug!("Merging input {} ({} pages)", index + 1, doc.page_count());
        if metadata.is_none() {
            metadata = Some(doc.metadata);
        }
        pages.extend(doc.pages);
    }

    let mut merged = PageDocument::from_pages(pages);
    if let Some(first) = metadata {
        merged.metadata = Metadata {
            page_count: merged.page_count(),
            encrypted: false,
            ..first
        };
    }
    log::info!("Merged into {} pages", merged.page_count());
    Ok(merged)
}
