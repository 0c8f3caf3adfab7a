//! # repdf
//!
//! PDF page-stream transformations for Rust.
//!
//! This library reshapes PDF documents and raster images page by page:
//! merging files, selecting pages, compressing by re-rendering pages as
//! JPEG, turning images into a PDF, and extracting plain text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use repdf::{merge_files, split_file};
//!
//! fn main() -> repdf::Result<()> {
//!     // Concatenate two PDFs
//!     let merged = merge_files(&["a.pdf", "b.pdf"])?;
//!     merged.save("merged.pdf")?;
//!
//!     // Keep pages 1-2 and 5
//!     let part = split_file("merged.pdf", "1-2,5")?;
//!     part.save("part.pdf")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Merge / split**: pages keep their original vector content
//! - **Compress**: rasterize-recompress with pdfium (`pdfium` feature)
//! - **Image embedding**: JPEG and PNG, one page per image at pixel size
//! - **Text extraction**: with an optional cleanup pipeline
//! - **Parallel processing**: Uses Rayon for page encoding

pub mod cleanup;
pub mod codec;
pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod raster;
pub mod transform;

// Re-export commonly used types
pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use codec::{CodecRegistry, DocumentCodec, ImageCodec, ImageOutput, PdfCodec};
pub use config::{ConfigStore, ToolConfig};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat, SourceFormat};
pub use error::{Error, ErrorKind, Result};
pub use model::{
    Metadata, OutputArtifact, Page, PageContent, PageDocument, PageRange, RasterImage,
    SourceFile, VectorPage,
};
#[cfg(feature = "pdfium")]
pub use raster::PdfiumRasterizer;
pub use raster::{default_rasterizer, PageRasterizer};
pub use transform::{CompressOptions, ErrorMode, TextOptions};

use std::path::Path;

/// Suggested filename of a merge result.
pub const MERGED_FILENAME: &str = "merged.pdf";
/// Suggested filename of a split result.
pub const SPLIT_FILENAME: &str = "split.pdf";
/// Suggested filename of a compress result.
pub const COMPRESSED_FILENAME: &str = "compressed.pdf";
/// Suggested filename of an image embed result.
pub const IMAGES_FILENAME: &str = "images.pdf";
/// Suggested filename of extracted text.
pub const TEXT_FILENAME: &str = "extracted.txt";

/// Merge PDF files in the given order.
///
/// # Example
///
/// ```no_run
/// use repdf::merge_files;
///
/// let merged = merge_files(&["a.pdf", "b.pdf", "c.pdf"]).unwrap();
/// merged.save("merged.pdf").unwrap();
/// ```
pub fn merge_files<P: AsRef<Path>>(paths: &[P]) -> Result<OutputArtifact> {
    let sources = read_sources(paths)?;
    Repdf::new().merge(&sources)
}

/// Select pages of a PDF file with a range like `"1-3,5"`.
///
/// # Example
///
/// ```no_run
/// use repdf::split_file;
///
/// let part = split_file("document.pdf", "2-4").unwrap();
/// part.save("pages-2-4.pdf").unwrap();
/// ```
pub fn split_file<P: AsRef<Path>>(path: P, range: &str) -> Result<OutputArtifact> {
    let range: PageRange = range.parse()?;
    Repdf::new().split(&SourceFile::from_path(path)?, &range)
}

/// Compress a PDF file by re-rendering every page as JPEG.
///
/// Lossy: text in the result is no longer selectable.
///
/// # Example
///
/// ```no_run
/// use repdf::{compress_file, CompressOptions};
///
/// let options = CompressOptions::new().with_scale(0.8).with_quality(0.5);
/// let small = compress_file("scan.pdf", &options).unwrap();
/// small.save("scan-small.pdf").unwrap();
/// ```
#[cfg(feature = "pdfium")]
pub fn compress_file<P: AsRef<Path>>(path: P, options: &CompressOptions) -> Result<OutputArtifact> {
    let source = SourceFile::from_path(path)?;
    Repdf::new().compress_with(&source, options)
}

/// Build a PDF with one page per image file.
///
/// # Example
///
/// ```no_run
/// use repdf::images_to_pdf;
///
/// let album = images_to_pdf(&["front.jpg", "back.png"]).unwrap();
/// album.save("album.pdf").unwrap();
/// ```
pub fn images_to_pdf<P: AsRef<Path>>(paths: &[P]) -> Result<OutputArtifact> {
    let sources = read_sources(paths)?;
    Repdf::new().images(&sources)
}

/// Extract plain text from a PDF file.
///
/// # Example
///
/// ```no_run
/// use repdf::extract_text;
///
/// let text = extract_text("document.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let source = SourceFile::from_path(path)?;
    let doc = Repdf::new().decode_pdf(&source)?;
    transform::extract_text(&doc, &TextOptions::default())
}

/// Read metadata of a PDF or image file.
pub fn inspect_file<P: AsRef<Path>>(path: P) -> Result<Metadata> {
    Repdf::new().inspect(&SourceFile::from_path(path)?)
}

fn read_sources<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SourceFile>> {
    paths.iter().map(SourceFile::from_path).collect()
}

/// Builder for running transforms with shared settings.
///
/// # Example
///
/// ```no_run
/// use repdf::{Repdf, SourceFile, ToolConfig, CleanupPreset};
///
/// let mut config = ToolConfig::default();
/// config.cleanup = Some(CleanupPreset::Standard);
///
/// let source = SourceFile::from_path("document.pdf")?;
/// let text = Repdf::from_config(config).lenient().text(&source, None)?;
/// text.save("document.txt")?;
/// # Ok::<(), repdf::Error>(())
/// ```
pub struct Repdf {
    config: ToolConfig,
    registry: CodecRegistry,
    rasterizer: Option<Box<dyn PageRasterizer>>,
}

impl Repdf {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ToolConfig::default())
    }

    /// Create a builder from a loaded config.
    pub fn from_config(config: ToolConfig) -> Self {
        Self {
            config,
            registry: CodecRegistry::with_defaults(),
            rasterizer: None,
        }
    }

    /// Use a custom codec registry.
    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Use a specific rasterizer for compress.
    ///
    /// Without one, [`default_rasterizer`] is used when compress runs.
    pub fn with_rasterizer(mut self, rasterizer: impl PageRasterizer + 'static) -> Self {
        self.rasterizer = Some(Box::new(rasterizer));
        self
    }

    /// Set cleanup preset for text extraction.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.config.cleanup = Some(preset);
        self
    }

    /// Skip unreadable pages during text extraction.
    pub fn lenient(mut self) -> Self {
        self.config.lenient_text = true;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.config.parallel = false;
        self
    }

    /// The active config.
    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Merge PDFs in order into `merged.pdf`.
    ///
    /// Every input must be a PDF; all are checked before any is decoded, and
    /// one that fails to decode aborts the merge.
    pub fn merge(&self, sources: &[SourceFile]) -> Result<OutputArtifact> {
        if sources.len() < transform::MIN_MERGE_INPUTS {
            return Err(Error::NotEnoughInputs {
                required: transform::MIN_MERGE_INPUTS,
                actual: sources.len(),
            });
        }
        for source in sources {
            require_pdf(source)?;
        }

        let docs = sources
            .iter()
            .map(|source| self.decode_pdf(source))
            .collect::<Result<Vec<_>>>()?;
        let merged = transform::merge(docs)?;
        self.write_pdf(MERGED_FILENAME, &merged)
    }

    /// Select pages of a PDF into `split.pdf`.
    pub fn split(&self, source: &SourceFile, range: &PageRange) -> Result<OutputArtifact> {
        if range.is_empty() {
            return Err(Error::EmptySelection);
        }
        let doc = self.decode_pdf(source)?;
        let selected = transform::split(&doc, range)?;
        self.write_pdf(SPLIT_FILENAME, &selected)
    }

    /// Compress a PDF into `compressed.pdf` with the configured options.
    ///
    /// Lossy: every page becomes a JPEG and text is no longer selectable.
    pub fn compress(&self, source: &SourceFile) -> Result<OutputArtifact> {
        self.compress_with(source, &self.config.compress_options())
    }

    /// Compress a PDF into `compressed.pdf` with explicit options.
    pub fn compress_with(&self, source: &SourceFile, options: &CompressOptions) -> Result<OutputArtifact> {
        require_pdf(source)?;
        let compressed = match self.rasterizer {
            Some(ref rasterizer) => transform::compress(source.bytes(), rasterizer.as_ref(), options)?,
            None => {
                let rasterizer = default_rasterizer()?;
                transform::compress(source.bytes(), rasterizer.as_ref(), options)?
            }
        };

        let artifact = self.write_pdf(COMPRESSED_FILENAME, &compressed)?;
        log::info!(
            "{}: {} -> {} bytes",
            source.name(),
            source.len(),
            artifact.len()
        );
        Ok(artifact)
    }

    /// Build `images.pdf` with one page per image.
    pub fn images(&self, sources: &[SourceFile]) -> Result<OutputArtifact> {
        let doc = transform::embed_images(sources)?;
        self.write_pdf(IMAGES_FILENAME, &doc)
    }

    /// Extract the text of a PDF into `extracted.txt`.
    ///
    /// With `pages`, only the selected pages are read, in range order.
    pub fn text(&self, source: &SourceFile, pages: Option<&PageRange>) -> Result<OutputArtifact> {
        let doc = self.decode_pdf(source)?;
        let doc = match pages {
            Some(range) => transform::split(&doc, range)?,
            None => doc,
        };
        let text = transform::extract_text(&doc, &self.config.text_options())?;
        Ok(OutputArtifact::text(TEXT_FILENAME, text))
    }

    /// Read metadata of a PDF or image.
    pub fn inspect(&self, source: &SourceFile) -> Result<Metadata> {
        let doc = self.registry.decode_source(source)?;
        Ok(doc.metadata)
    }

    /// Decode a source that must be a PDF.
    pub fn decode_pdf(&self, source: &SourceFile) -> Result<PageDocument> {
        require_pdf(source)?;
        self.registry.decode_source(source)
    }

    fn write_pdf(&self, filename: &str, doc: &PageDocument) -> Result<OutputArtifact> {
        let bytes = self.registry.encode(doc, "pdf")?;
        Ok(OutputArtifact::pdf(filename, bytes))
    }
}

impl Default for Repdf {
    fn default() -> Self {
        Self::new()
    }
}

fn require_pdf(source: &SourceFile) -> Result<()> {
    match source.format() {
        Ok(format) if format.is_pdf() => Ok(()),
        Ok(format) => Err(Error::UnexpectedFormat {
            name: source.name().to_string(),
            expected: "application/pdf",
            found: format.mime_type().to_string(),
        }),
        Err(_) => Err(Error::UnexpectedFormat {
            name: source.name().to_string(),
            expected: "application/pdf",
            found: source.mime_hint(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Builder Pattern Tests ====================

    #[test]
    fn test_repdf_builder_default() {
        let builder = Repdf::default();
        assert_eq!(builder.config(), &ToolConfig::default());
        assert!(builder.rasterizer.is_none());
    }

    #[test]
    fn test_repdf_builder_chained() {
        let builder = Repdf::new()
            .lenient()
            .with_cleanup(CleanupPreset::Aggressive)
            .sequential();

        assert!(builder.config().lenient_text);
        assert_eq!(builder.config().cleanup, Some(CleanupPreset::Aggressive));
        assert!(!builder.config().parallel);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_merge_needs_two_sources() {
        let one = vec![SourceFile::new("a.pdf", b"%PDF-1.4\n".to_vec())];
        assert!(matches!(
            Repdf::new().merge(&one),
            Err(Error::NotEnoughInputs { required: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_merge_rejects_image_before_decoding() {
        // the first input is a broken PDF but must not be decoded
        let sources = vec![
            SourceFile::new("broken.pdf", b"%PDF-1.4\ngarbage".to_vec()),
            SourceFile::new("photo.png", b"\x89PNG\r\n\x1a\n....".to_vec()),
        ];
        match Repdf::new().merge(&sources) {
            Err(Error::UnexpectedFormat { name, found, .. }) => {
                assert_eq!(name, "photo.png");
                assert_eq!(found, "image/png");
            }
            other => panic!("unexpected result: {:?}", other.map(|a| a.len())),
        }
    }

    #[test]
    fn test_split_empty_range() {
        let source = SourceFile::new("a.pdf", b"%PDF-1.4\n".to_vec());
        let range = PageRange::parse("").unwrap();
        assert!(matches!(
            Repdf::new().split(&source, &range),
            Err(Error::EmptySelection)
        ));
    }

    #[test]
    fn test_text_rejects_unknown_bytes() {
        let source = SourceFile::new("notes.txt", b"plain words".to_vec()).with_declared_mime("text/plain");
        match Repdf::new().text(&source, None) {
            Err(Error::UnexpectedFormat { found, .. }) => assert_eq!(found, "text/plain"),
            other => panic!("unexpected result: {:?}", other.map(|a| a.len())),
        }
    }

    #[test]
    fn test_images_no_input() {
        assert!(matches!(Repdf::new().images(&[]), Err(Error::NoInput)));
    }

    #[test]
    fn test_detect_format_empty_data() {
        let result = detect_format_from_bytes(&[]);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[cfg(not(feature = "pdfium"))]
    #[test]
    fn test_compress_without_rasterizer() {
        let source = SourceFile::new("a.pdf", b"%PDF-1.4\n".to_vec());
        assert!(matches!(
            Repdf::new().compress(&source),
            Err(Error::RasterizerUnavailable(_))
        ));
    }
}
