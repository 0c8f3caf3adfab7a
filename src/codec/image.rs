//! Raster image codec (JPEG and PNG).

use std::io::Cursor;

use image::ImageFormat;

use crate::detect::{detect_format_from_bytes, SourceFormat};
use crate::error::{Error, Result};
use crate::model::{Metadata, Page, PageDocument, RasterEncoding, RasterImage};

use super::DocumentCodec;

/// Output format for [`ImageCodec::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageOutput {
    /// Lossless PNG
    #[default]
    Png,
    /// JPEG at the given quality (1-100)
    Jpeg(u8),
}

/// Image codec.
///
/// Decodes a JPEG or PNG into a one-page document whose page is exactly the
/// image's pixel size. Encodes a one-page raster document back to an image.
#[derive(Debug, Clone, Default)]
pub struct ImageCodec {
    output: ImageOutput,
}

impl ImageCodec {
    /// Create an image codec writing PNG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the encode output format.
    pub fn with_output(mut self, output: ImageOutput) -> Self {
        self.output = output;
        self
    }

    /// Decode image bytes into a raster.
    pub fn decode_image(bytes: &[u8]) -> Result<RasterImage> {
        match detect_format_from_bytes(bytes) {
            Ok(SourceFormat::Jpeg) => RasterImage::from_jpeg(bytes),
            Ok(SourceFormat::Png) => RasterImage::from_png(bytes),
            Ok(other) => Err(Error::Image(format!("{} is not a raster image", other))),
            Err(e) => Err(e),
        }
    }
}

impl DocumentCodec for ImageCodec {
    fn name(&self) -> &str {
        "image"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["jpg", "jpeg", "png"]
    }

    fn mime_type(&self) -> &'static str {
        match self.output {
            ImageOutput::Png => "image/png",
            ImageOutput::Jpeg(_) => "image/jpeg",
        }
    }

    fn handles(&self, format: &SourceFormat) -> bool {
        format.is_image()
    }

    fn decode(&self, bytes: &[u8]) -> Result<PageDocument> {
        let image = Self::decode_image(bytes)?;
        log::debug!(
            "Decoded {}x{} image ({:?})",
            image.width,
            image.height,
            image.encoding
        );

        let mut doc = PageDocument::from_pages(vec![Page::from_image(image)]);
        doc.metadata = Metadata {
            page_count: 1,
            ..Metadata::default()
        };
        Ok(doc)
    }

    fn encode(&self, doc: &PageDocument) -> Result<Vec<u8>> {
        let image = match doc.pages.as_slice() {
            [page] => page
                .raster_image()
                .ok_or_else(|| Error::Encoding("vector pages cannot be written as images".into()))?,
            pages => {
                return Err(Error::Encoding(format!(
                    "image output needs exactly one page, got {}",
                    pages.len()
                )))
            }
        };

        match self.output {
            ImageOutput::Jpeg(_) if image.encoding == RasterEncoding::Jpeg => Ok(image.data.clone()),
            ImageOutput::Jpeg(quality) => {
                let pixels = image.to_dynamic()?;
                Ok(RasterImage::encode_jpeg(&pixels, quality)?.data)
            }
            ImageOutput::Png => {
                let pixels = image.to_dynamic()?;
                let mut buffer = Vec::new();
                pixels.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
                Ok(buffer)
            }
        }
    }
}
