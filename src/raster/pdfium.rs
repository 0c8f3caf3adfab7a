//! Rasterizer backed by the pdfium library.

use std::path::PathBuf;

use image::DynamicImage;
use pdfium_render::prelude::*;

use super::PageRasterizer;
use crate::error::{Error, Result};

/// Environment variable naming the pdfium library file or its directory.
pub const LIBRARY_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Renders pages with pdfium.
///
/// The library is looked up in `PDFIUM_LIB_PATH` (or an explicit path),
/// then in the working directory, then in the system library path.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    /// Create a rasterizer configured from the environment, checking that
    /// the library can be loaded.
    pub fn new() -> Result<Self> {
        let rasterizer = Self::from_env();
        rasterizer.bind()?;
        Ok(rasterizer)
    }

    /// Create a rasterizer configured from `PDFIUM_LIB_PATH`, without
    /// loading the library yet.
    pub fn from_env() -> Self {
        Self {
            library_path: std::env::var_os(LIBRARY_PATH_ENV).map(PathBuf::from),
        }
    }

    /// Use an explicit library file or directory.
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium> {
        let mut attempts = Vec::new();

        let mut candidates = Vec::new();
        if let Some(ref path) = self.library_path {
            if path.is_file() {
                candidates.push(path.clone());
            } else {
                candidates.push(PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(path)));
            }
        }
        candidates.push(PathBuf::from(Pdfium::pdfium_platform_library_name_at_path("./")));

        for candidate in candidates {
            match Pdfium::bind_to_library(&candidate) {
                Ok(bindings) => {
                    log::debug!("Bound pdfium from {}", candidate.display());
                    return Ok(Pdfium::new(bindings));
                }
                Err(e) => attempts.push(format!("{}: {:?}", candidate.display(), e)),
            }
        }

        match Pdfium::bind_to_system_library() {
            Ok(bindings) => Ok(Pdfium::new(bindings)),
            Err(e) => {
                attempts.push(format!("system library: {:?}", e));
                Err(Error::RasterizerUnavailable(format!(
                    "pdfium not found ({})",
                    attempts.join("; ")
                )))
            }
        }
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn rasterize(&self, pdf: &[u8], scale: f32) -> Result<Vec<DynamicImage>> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| Error::Corrupted(format!("pdfium could not open document: {:?}", e)))?;

        let config = PdfRenderConfig::new()
            .scale_page_by_factor(scale)
            .render_form_data(true);

        let pages = document.pages();
        let mut images = Vec::with_capacity(pages.len() as usize);

        for (index, page) in pages.iter().enumerate() {
            let number = index as u32 + 1;
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| Error::Rasterize {
                    page: number,
                    detail: format!("{:?}", e),
                })?;

            let image = bitmap.as_image();
            log::debug!(
                "Rendered page {} -> {}x{} px",
                number,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        Ok(images)
    }
}
