//! Page rasterization.
//!
//! Compression renders every page to pixels. Rendering PDF content needs a
//! full PDF engine, so it sits behind the [`PageRasterizer`] trait; the
//! `pdfium` feature provides [`PdfiumRasterizer`].

#[cfg(feature = "pdfium")]
mod pdfium;

#[cfg(feature = "pdfium")]
pub use pdfium::{PdfiumRasterizer, LIBRARY_PATH_ENV};

use image::DynamicImage;

use crate::error::Result;

/// Renders PDF pages to images.
pub trait PageRasterizer: Send + Sync {
    /// Get the name of this rasterizer.
    fn name(&self) -> &str;

    /// Render every page of `pdf`, in page order.
    ///
    /// At `scale` 1.0 one pixel covers one point. Page rotation is applied,
    /// so a page rotated by 90 degrees renders with swapped dimensions.
    fn rasterize(&self, pdf: &[u8], scale: f32) -> Result<Vec<DynamicImage>>;
}

impl<R: PageRasterizer + ?Sized> PageRasterizer for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn rasterize(&self, pdf: &[u8], scale: f32) -> Result<Vec<DynamicImage>> {
        (**self).rasterize(pdf, scale)
    }
}

impl<R: PageRasterizer + ?Sized> PageRasterizer for std::sync::Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn rasterize(&self, pdf: &[u8], scale: f32) -> Result<Vec<DynamicImage>> {
        (**self).rasterize(pdf, scale)
    }
}

/// The rasterizer compiled into this build.
///
/// Returns [`Error::RasterizerUnavailable`](crate::Error::RasterizerUnavailable)
/// when no backend is enabled or the pdfium library cannot be loaded.
pub fn default_rasterizer() -> Result<Box<dyn PageRasterizer>> {
    #[cfg(feature = "pdfium")]
    {
        Ok(Box::new(PdfiumRasterizer::new()?))
    }

    #[cfg(not(feature = "pdfium"))]
    {
        Err(crate::error::Error::RasterizerUnavailable(
            "built without the `pdfium` feature".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    struct Blank;

    impl PageRasterizer for Blank {
        fn name(&self) -> &str {
            "blank"
        }

        fn rasterize(&self, _pdf: &[u8], scale: f32) -> Result<Vec<DynamicImage>> {
            let side = (10.0 * scale) as u32;
            Ok(vec![DynamicImage::ImageRgb8(RgbImage::new(side, side))])
        }
    }

    #[test]
    fn test_boxed_rasterizer_delegates() {
        let boxed: Box<dyn PageRasterizer> = Box::new(Blank);
        assert_eq!(boxed.name(), "blank");
        let images = boxed.rasterize(b"", 2.0).unwrap();
        assert_eq!(images[0].width(), 20);
    }

    #[cfg(not(feature = "pdfium"))]
    #[test]
    fn test_default_rasterizer_unavailable() {
        let result = default_rasterizer();
        assert!(matches!(
            result,
            Err(crate::error::Error::RasterizerUnavailable(_))
        ));
    }
}
