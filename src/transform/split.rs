//! Select pages from a document.

use crate::error::{Error, Result};
use crate::model::{PageDocument, PageRange};

/// Build a document holding the pages named by `range`, in range order.
///
/// Every index is checked before any page is copied: an index past the end
/// fails with [`Error::PageOutOfRange`], an empty range with
/// [`Error::EmptySelection`].
pub fn split(doc: &PageDocument, range: &PageRange) -> Result<PageDocument> {
    if range.is_empty() {
        return Err(Error::EmptySelection);
    }

    let count = doc.page_count();
    if let Some(page) = range.iter().find(|&p| p == 0 || p > count) {
        return Err(Error::PageOutOfRange(page, count));
    }

    let pages = range
        .iter()
        .filter_map(|p| doc.get_page(p).cloned())
        .collect();

    let mut selected = PageDocument::from_pages(pages);
    selected.metadata = doc.metadata.clone();
    selected.metadata.page_count = selected.page_count();
    selected.metadata.encrypted = false;

    log::info!("Selected {} of {} pages ({})", selected.page_count(), count, range);
    Ok(selected)
}
