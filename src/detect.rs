//! Source format detection by magic bytes.
//!
//! The declared MIME type of an upload is advisory only; every operation
//! decides what it is looking at from the leading bytes of the content.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// A detected source format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFormat {
    /// A PDF document
    Pdf(PdfFormat),
    /// A JPEG image
    Jpeg,
    /// A PNG image
    Png,
}

impl SourceFormat {
    /// MIME type of the format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            SourceFormat::Pdf(_) => "application/pdf",
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Png => "image/png",
        }
    }

    /// Canonical file extension (lowercase, no dot).
    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Pdf(_) => "pdf",
            SourceFormat::Jpeg => "jpg",
            SourceFormat::Png => "png",
        }
    }

    /// Whether this is a PDF document.
    pub fn is_pdf(&self) -> bool {
        matches!(self, SourceFormat::Pdf(_))
    }

    /// Whether this is a raster image.
    pub fn is_image(&self) -> bool {
        matches!(self, SourceFormat::Jpeg | SourceFormat::Png)
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Pdf(pdf) => pdf.fmt(f),
            SourceFormat::Jpeg => f.write_str("JPEG"),
            SourceFormat::Png => f.write_str("PNG"),
        }
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Number of leading bytes needed to tell the formats apart.
const HEADER_LEN: u64 = 16;

/// Detect the format of a file on disk.
///
/// # Example
/// ```no_run
/// use repdf::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("scan.png").unwrap();
/// println!("{} ({})", format, format.mime_type());
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_LEN as usize);
    file.take(HEADER_LEN).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the format of in-memory content.
///
/// # Returns
/// * `Ok(SourceFormat)` for PDF, JPEG and PNG content
/// * `Err(Error::UnknownFormat)` for anything else
/// * `Err(Error::UnsupportedVersion)` for a PDF header with a garbled version
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SourceFormat> {
    if data.starts_with(PNG_MAGIC) {
        return Ok(SourceFormat::Png);
    }
    if data.starts_with(JPEG_MAGIC) {
        return Ok(SourceFormat::Jpeg);
    }
    detect_pdf_from_bytes(data).map(SourceFormat::Pdf)
}

/// Detect a PDF header.
///
/// # Arguments
/// * `data` - Byte slice containing at least the first 8 bytes of the file
pub fn detect_pdf_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN {
        return Err(Error::UnknownFormat);
    }

    if !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    // Extract version string (e.g., "1.7" from "%PDF-1.7")
    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfFormat { version })
}

/// Check if a version string is valid.
fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Check if a file is a valid PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format_from_path(path), Ok(SourceFormat::Pdf(_)))
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_pdf_from_bytes(data).is_ok()
}

/// Check if bytes are an image that can be embedded as a page.
pub fn is_embeddable_image(data: &[u8]) -> bool {
    matches!(
        detect_format_from_bytes(data),
        Ok(SourceFormat::Jpeg | SourceFormat::Png)
    )
}
