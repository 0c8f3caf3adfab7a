//! Rasterize-recompress.

use image::DynamicImage;
use rayon::prelude::*;

use super::CompressOptions;
use crate::codec::{DocumentCodec, PdfCodec};
use crate::error::{Error, Result};
use crate::model::{Page, PageDocument, RasterImage};
use crate::raster::PageRasterizer;

/// Re-render every page of a PDF as a JPEG image.
///
/// This is lossy: the result has no text layer and no vector content, only
/// one image per page. Each output page keeps the displayed size of its
/// source page, so rotated pages come out upright with swapped width and
/// height. A page that fails to render aborts the whole operation.
pub fn compress(
    pdf: &[u8],
    rasterizer: &dyn PageRasterizer,
    options: &CompressOptions,
) -> Result<PageDocument> {
    let options = options.clamped();
    let source = PdfCodec::new().decode(pdf)?;
    if source.is_empty() {
        return Err(Error::EmptySelection);
    }

    log::info!(
        "Rasterizing {} pages with {} (scale {:.2}, quality {:.2})",
        source.page_count(),
        rasterizer.name(),
        options.scale,
        options.quality
    );

    let images = rasterizer.rasterize(pdf, options.scale)?;
    if images.len() != source.pages.len() {
        return Err(Error::Rasterize {
            page: images.len() as u32 + 1,
            detail: format!(
                "renderer returned {} images for {} pages",
                images.len(),
                source.pages.len()
            ),
        });
    }

    let quality = options.jpeg_quality();
    let encode = |(index, image): (usize, &DynamicImage)| -> Result<RasterImage> {
        let jpeg = RasterImage::encode_jpeg(image, quality).map_err(|e| Error::Rasterize {
            page: index as u32 + 1,
            detail: e.to_string(),
        })?;
        log::debug!(
            "Page {}: {}x{} px, {} bytes",
            index + 1,
            jpeg.width,
            jpeg.height,
            jpeg.data.len()
        );
        Ok(jpeg)
    };

    let encoded: Vec<RasterImage> = if options.parallel {
        images.par_iter().enumerate().map(encode).collect::<Result<_>>()?
    } else {
        images.iter().enumerate().map(encode).collect::<Result<_>>()?
    };

    let pages = source
        .pages
        .iter()
        .zip(encoded)
        .map(|(page, image)| {
            let (width, height) = page.display_dimensions();
            Page::raster(width, height, image)
        })
        .collect();

    let mut compressed = PageDocument::from_pages(pages);
    compressed.metadata = source.metadata;
    compressed.metadata.page_count = compressed.page_count();
    Ok(compressed)
}
