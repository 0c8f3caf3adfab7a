//! Operation outputs.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// The result of one operation: bytes plus a suggested filename.
///
/// The library never writes artifacts on its own; call [`save`](Self::save)
/// or [`save_in`](Self::save_in) to persist one.
#[derive(Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    filename: String,
    mime_type: &'static str,
    bytes: Vec<u8>,
}

impl OutputArtifact {
    /// Create an artifact.
    pub fn new(filename: impl Into<String>, mime_type: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type,
            bytes,
        }
    }

    /// Create a PDF artifact.
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(filename, "application/pdf", bytes)
    }

    /// Create a plain-text artifact.
    pub fn text(filename: impl Into<String>, text: String) -> Self {
        Self::new(filename, "text/plain; charset=utf-8", text.into_bytes())
    }

    /// Suggested filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// MIME type of the content.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the artifact, returning its content.
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

    /// Override the suggested filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Write the content to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// Write the content into `dir` under the suggested filename, creating
    /// the directory if needed.
    pub fn save_in<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        self.save(&path)?;
        log::info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

impl fmt::Debug for OutputArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputArtifact")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
