//! Codecs turning source bytes into page documents and back.
//!
//! A codec sits at the boundary between bytes and the page model. The
//! registry maps file extensions, names and sniffed formats to codecs, so
//! new input or output formats can be plugged in without touching the
//! transforms.
//!
//! # Example
//!
//! ```no_run
//! use repdf::codec::CodecRegistry;
//! use repdf::SourceFile;
//!
//! fn main() -> repdf::Result<()> {
//!     let registry = CodecRegistry::with_defaults();
//!     let source = SourceFile::from_path("document.pdf")?;
//!     let doc = registry.decode_source(&source)?;
//!     println!("{} pages", doc.page_count());
//!     Ok(())
//! }
//! ```

mod graph;
mod image;
mod pdf;

pub use self::image::{ImageCodec, ImageOutput};
pub use pdf::PdfCodec;

use crate::detect::{detect_format_from_bytes, SourceFormat};
use crate::error::{Error, Result};
use crate::model::{PageDocument, SourceFile};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Trait for document codecs.
///
/// Implement this trait to add support for a new document format.
pub trait DocumentCodec: Send + Sync {
    /// Get the name of this codec.
    fn name(&self) -> &str;

    /// Get the supported file extensions for this codec.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// MIME type produced by [`encode`](Self::encode).
    fn mime_type(&self) -> &'static str;

    /// Check if this codec can decode content of the given format.
    fn handles(&self, format: &SourceFormat) -> bool;

    /// Decode bytes into a page document.
    fn decode(&self, bytes: &[u8]) -> Result<PageDocument>;

    /// Encode a page document into bytes.
    fn encode(&self, doc: &PageDocument) -> Result<Vec<u8>>;

    /// Check if this codec supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document codecs.
///
/// Codecs registered later take precedence when several handle the same
/// sniffed format.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: Vec<Arc<dyn DocumentCodec>>,
    by_extension: HashMap<String, Arc<dyn DocumentCodec>>,
    by_name: HashMap<String, Arc<dyn DocumentCodec>>,
}

impl CodecRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            codecs: Vec::new(),
            by_extension: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with default codecs (PDF, image).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfCodec::new()));
        registry.register(Arc::new(ImageCodec::new()));
        registry
    }

    /// Register a codec.
    ///
    /// The codec will be registered for all its supported extensions.
    pub fn register(&mut self, codec: Arc<dyn DocumentCodec>) {
        for ext in codec.supported_extensions() {
            self.by_extension.insert(ext.to_lowercase(), codec.clone());
        }
        self.by_name.insert(codec.name().to_lowercase(), codec.clone());
        self.codecs.push(codec);
    }

    /// Get a codec by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentCodec>> {
        self.by_extension.get(&ext.to_lowercase()).cloned()
    }

    /// Get a codec by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentCodec>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Get the codec that decodes the given format.
    pub fn get_by_format(&self, format: &SourceFormat) -> Option<Arc<dyn DocumentCodec>> {
        self.codecs.iter().rev().find(|c| c.handles(format)).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.by_extension.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.by_extension.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Decode bytes with the codec matching their sniffed format.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<PageDocument> {
        let format = detect_format_from_bytes(bytes)?;
        let codec = self
            .get_by_format(&format)
            .ok_or_else(|| Error::Other(format!("No codec for format: {}", format)))?;
        codec.decode(bytes)
    }

    /// Decode a source file with the codec matching its sniffed format.
    pub fn decode_source(&self, source: &SourceFile) -> Result<PageDocument> {
        let format = source.format()?;
        let codec = self
            .get_by_format(&format)
            .ok_or_else(|| Error::Other(format!("{}: no codec for {}", source.name(), format)))?;
        log::debug!("Decoding {} with {} codec", source.name(), codec.name());
        codec.decode(source.bytes())
    }

    /// Decode a file on disk.
    pub fn decode_path(&self, path: &Path) -> Result<PageDocument> {
        self.decode_source(&SourceFile::from_path(path)?)
    }

    /// Encode a document with the codec registered for `ext`.
    pub fn encode(&self, doc: &PageDocument, ext: &str) -> Result<Vec<u8>> {
        let codec = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::Other(format!("No codec for extension: {}", ext)))?;
        codec.encode(doc)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.codecs.iter().map(|c| c.name()))
            .finish()
    }
}
