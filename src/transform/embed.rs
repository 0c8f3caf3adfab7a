//! Build a document from images.

use crate::codec::ImageCodec;
use crate::error::{Error, Result};
use crate::model::{Page, PageDocument, SourceFile};

/// One page per image, in input order.
///
/// Every input is checked before any is decoded: anything that is not a
/// JPEG or PNG fails with [`Error::UnsupportedImage`]. Each page is exactly
/// the image's pixel size, one point per pixel.
pub fn embed_images(sources: &[SourceFile]) -> Result<PageDocument> {
    if sources.is_empty() {
        return Err(Error::NoInput);
    }

    for source in sources {
        let embeddable = matches!(source.format(), Ok(format) if format.is_image());
        if !embeddable {
            return Err(Error::UnsupportedImage {
                name: source.name().to_string(),
                mime: source.mime_hint(),
            });
        }
    }

    let mut doc = PageDocument::new();
    for source in sources {
        let image = ImageCodec::decode_image(source.bytes())?;
        log::debug!(
            "{}: {}x{} ({:?})",
            source.name(),
            image.width,
            image.height,
            image.encoding
        );
        doc.add_page(Page::from_image(image));
    }

    log::info!("Embedded {} images", doc.page_count());
    Ok(doc)
}
