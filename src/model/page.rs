//! Page-level types.

use std::fmt;
use std::sync::Arc;

use lopdf::{Document as LoDocument, ObjectId};

use super::RasterImage;
use crate::error::{Error, Result};

/// A single page of a [`PageDocument`](super::PageDocument).
#[derive(Debug, Clone)]
pub struct Page {
    /// Width of the visible page area (CropBox within MediaBox) in points
    /// (1 point = 1/72 inch), before rotation
    pub width: f32,

    /// Height of the visible page area in points, before rotation
    pub height: f32,

    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,

    /// Drawable content
    pub content: PageContent,
}

impl Page {
    /// Create a page backed by a source PDF page.
    pub fn vector(width: f32, height: f32, content: VectorPage) -> Self {
        Self {
            width,
            height,
            rotation: 0,
            content: PageContent::Vector(content),
        }
    }

    /// Create a page that draws an image over its whole area.
    pub fn raster(width: f32, height: f32, image: RasterImage) -> Self {
        Self {
            width,
            height,
            rotation: 0,
            content: PageContent::Raster(image),
        }
    }

    /// Create a page sized to the image, one point per pixel.
    pub fn from_image(image: RasterImage) -> Self {
        let (w, h) = image.dimensions();
        Self::raster(w as f32, h as f32, image)
    }

    /// Set the rotation, normalized to a multiple of 90 in `0..360`.
    pub fn with_rotation(mut self, degrees: i64) -> Self {
        self.rotation = normalize_rotation(degrees);
        self
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Dimensions as displayed, with width and height swapped for
    /// 90 and 270 degree rotations.
    pub fn display_dimensions(&self) -> (f32, f32) {
        if self.rotation % 180 == 90 {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Check if the page is in landscape orientation as displayed.
    pub fn is_landscape(&self) -> bool {
        let (w, h) = self.display_dimensions();
        w > h
    }

    /// Check if the page is still backed by its source PDF.
    pub fn is_vector(&self) -> bool {
        matches!(self.content, PageContent::Vector(_))
    }

    /// Check if the page is a full-page image.
    pub fn is_raster(&self) -> bool {
        matches!(self.content, PageContent::Raster(_))
    }

    /// The image of a raster page.
    pub fn raster_image(&self) -> Option<&RasterImage> {
        match &self.content {
            PageContent::Raster(image) => Some(image),
            PageContent::Vector(_) => None,
        }
    }

    /// The source page of a vector page.
    pub fn vector_page(&self) -> Option<&VectorPage> {
        match &self.content {
            PageContent::Vector(page) => Some(page),
            PageContent::Raster(_) => None,
        }
    }
}

/// Rotation in `0..360`, rounded to a quarter turn.
pub(crate) fn normalize_rotation(degrees: i64) -> u16 {
    let quarter = (degrees as f64 / 90.0).round() as i64;
    (quarter.rem_euclid(4) * 90) as u16
}

/// Drawable content of a page.
#[derive(Debug, Clone)]
pub enum PageContent {
    /// Vector content still living in the source object graph
    Vector(VectorPage),

    /// A full-page raster image
    Raster(RasterImage),
}

/// A reference to a page inside a parsed source PDF.
///
/// The source is shared, so pages of one document can be split or merged
/// without copying the object graph until the result is encoded.
#[derive(Clone)]
pub struct VectorPage {
    source: Arc<LoDocument>,
    object_id: ObjectId,
    number: u32,
}

impl VectorPage {
    pub(crate) fn new(source: Arc<LoDocument>, object_id: ObjectId, number: u32) -> Self {
        Self {
            source,
            object_id,
            number,
        }
    }

    /// The parsed source document.
    pub fn source(&self) -> &Arc<LoDocument> {
        &self.source
    }

    /// Object id of the page dictionary in the source.
    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    /// Page number in the source (1-indexed).
    pub fn source_page(&self) -> u32 {
        self.number
    }

    /// Check if both pages come from the same parsed source.
    pub fn same_source(&self, other: &VectorPage) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }

    /// Extract the text layer of this page.
    pub fn extract_text(&self) -> Result<String> {
        self.source
            .extract_text(&[self.number])
            .map_err(|e| Error::TextExtract(format!("page {}: {}", self.number, e)))
    }
}

impl fmt::Debug for VectorPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorPage")
            .field("object_id", &self.object_id)
            .field("number", &self.number)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn tiny_image(w: u32, h: u32) -> RasterImage {
        let img = DynamicImage::ImageRgb8(RgbImage::new(w, h));
        RasterImage::from_dynamic(&img).unwrap()
    }

    #[test]
    fn test_page_from_image() {
        let page = Page::from_image(tiny_image(30, 20));
        assert_eq!(page.dimensions(), (30.0, 20.0));
        assert!(page.is_raster());
        assert!(page.is_landscape());
        assert!(page.vector_page().is_none());
    }

    #[test]
    fn test_rotation_normalization() {
        assert_eq!(normalize_rotation(0), 0);
        assert_eq!(normalize_rotation(90), 90);
        assert_eq!(normalize_rotation(-90), 270);
        assert_eq!(normalize_rotation(450), 90);
        assert_eq!(normalize_rotation(360), 0);
    }

    #[test]
    fn test_display_dimensions() {
        let page = Page::from_image(tiny_image(10, 40)).with_rotation(90);
        assert_eq!(page.dimensions(), (10.0, 40.0));
        assert_eq!(page.display_dimensions(), (40.0, 10.0));
        assert!(page.is_landscape());

        let page = Page::from_image(tiny_image(10, 40)).with_rotation(180);
        assert_eq!(page.display_dimensions(), (10.0, 40.0));
    }

    #[test]
    fn test_vector_page_identity() {
        let source = Arc::new(LoDocument::with_version("1.5"));
        let a = VectorPage::new(Arc::clone(&source), (3, 0), 1);
        let b = VectorPage::new(Arc::clone(&source), (4, 0), 2);
        let c = VectorPage::new(Arc::new(LoDocument::with_version("1.5")), (3, 0), 1);

        assert!(a.same_source(&b));
        assert!(!a.same_source(&c));
        assert_eq!(b.source_page(), 2);
        assert_eq!(b.object_id(), (4, 0));
    }
}
