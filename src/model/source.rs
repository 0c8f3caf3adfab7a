//! Input files.

use std::fmt;
use std::path::Path;

use crate::detect::{detect_format_from_bytes, SourceFormat};
use crate::error::Result;

/// A user-supplied input file: raw bytes plus a name and the MIME type the
/// caller declared for it.
///
/// The declared type is advisory; [`SourceFile::format`] always sniffs the
/// content. A `SourceFile` is immutable once created.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    declared_mime: Option<String>,
    bytes: Vec<u8>,
}

impl SourceFile {
    /// Create a source from in-memory bytes.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            declared_mime: None,
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. The declared MIME type is derived from the
    /// file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Ok(Self::from_read(path, bytes))
    }

    /// Read a file from disk without blocking the async runtime.
    #[cfg(feature = "async")]
    pub async fn read_async<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_read(path, bytes))
    }

    fn from_read(path: &Path, bytes: Vec<u8>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let declared_mime = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_from_extension)
            .map(str::to_string);

        Self {
            name,
            declared_mime,
            bytes,
        }
    }

    /// Set the declared MIME type.
    pub fn with_declared_mime(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime = Some(mime.into());
        self
    }

    /// Filename (no directory).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type declared by the caller, if any.
    pub fn declared_mime(&self) -> Option<&str> {
        self.declared_mime.as_deref()
    }

    /// Raw content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the source, returning its content.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Detect the real format from the content.
    pub fn format(&self) -> Result<SourceFormat> {
        let format = detect_format_from_bytes(&self.bytes)?;
        if let Some(declared) = self.mismatched_mime(&format) {
            log::warn!(
                "{}: declared as {}, content is {}",
                self.name,
                declared,
                format.mime_type()
            );
        }
        Ok(format)
    }

    /// The declared MIME type, if it disagrees with the detected format.
    fn mismatched_mime(&self, format: &SourceFormat) -> Option<&str> {
        self.declared_mime()
            .filter(|declared| !declared.eq_ignore_ascii_case(format.mime_type()))
    }

    /// Best-effort MIME type for error messages: the detected one, else the
    /// declared one, else `application/octet-stream`.
    pub fn mime_hint(&self) -> String {
        match detect_format_from_bytes(&self.bytes) {
            Ok(format) => format.mime_type().to_string(),
            Err(_) => self
                .declared_mime
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        }
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("declared_mime", &self.declared_mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// MIME type conventionally associated with a file extension.
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "jpg" | "jpeg" | "jpe" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "txt" => Some("text/plain"),
        "xlsx" => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        _ => None,
    }
}
