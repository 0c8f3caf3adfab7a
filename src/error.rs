//! Error types for repdf library.

use std::io;
use thiserror::Error;

/// Result type alias for repdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, transforming or writing documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a recognized document or image format.
    #[error("Unknown file format: not a PDF, JPEG or PNG")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// An input has a valid format, but not one the operation accepts.
    #[error("{name}: expected {expected}, found {found}")]
    UnexpectedFormat {
        /// Source filename
        name: String,
        /// What the operation accepts
        expected: &'static str,
        /// MIME type detected from the content
        found: String,
    },

    /// An image input is neither JPEG nor PNG.
    #[error("{name}: unsupported image type {mime} (only JPEG and PNG can be embedded)")]
    UnsupportedImage {
        /// Source filename
        name: String,
        /// MIME type detected from the content (or declared, if unknown)
        mime: String,
    },

    /// No input files were given.
    #[error("No input files selected")]
    NoInput,

    /// Too few inputs for the operation.
    #[error("At least {required} files are required, got {actual}")]
    NotEnoughInputs {
        /// Minimum number of inputs
        required: usize,
        /// Number of inputs given
        actual: usize,
    },

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted PDF structure: {0}")]
    Corrupted(String),

    /// Error decoding or encoding raster image data.
    #[error("Image error: {0}")]
    Image(String),

    /// A page could not be rendered to pixels.
    #[error("Failed to rasterize page {page}: {detail}")]
    Rasterize {
        /// 1-based page number
        page: u32,
        /// Renderer message
        detail: String,
    },

    /// No page renderer is available.
    #[error("Rasterizer unavailable: {0}")]
    RasterizerUnavailable(String),

    /// Error serializing a document.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The page selection resolved to no pages.
    #[error("No pages selected")]
    EmptySelection,

    /// Configuration could not be read or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Broad error categories.
///
/// Validation errors are raised before any transform starts; decode errors
/// come from the codec boundary; transform errors abort a running operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input selection, format or page range.
    Validation,
    /// Corrupt, encrypted or unreadable document data.
    Decode,
    /// Rasterization, encoding or extraction failure.
    Transform,
    /// File system failure.
    Io,
    /// Configuration failure.
    Config,
}

impl Error {
    /// Get the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::UnknownFormat
            | Error::UnexpectedFormat { .. }
            | Error::UnsupportedImage { .. }
            | Error::NoInput
            | Error::NotEnoughInputs { .. }
            | Error::PageOutOfRange(..)
            | Error::InvalidPageRange(_)
            | Error::EmptySelection => ErrorKind::Validation,
            Error::UnsupportedVersion(_)
            | Error::PdfParse(_)
            | Error::Encrypted
            | Error::Corrupted(_)
            | Error::Image(_) => ErrorKind::Decode,
            Error::Rasterize { .. }
            | Error::RasterizerUnavailable(_)
            | Error::Encoding(_)
            | Error::TextExtract(_)
            | Error::Other(_) => ErrorKind::Transform,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            _ => Error::Image(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
