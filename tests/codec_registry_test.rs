//! Integration tests for the codec registry.

mod common;

use std::sync::Arc;

use common::{numbered_pdf, png_bytes};
use repdf::codec::{CodecRegistry, DocumentCodec, ImageCodec, ImageOutput, PdfCodec};
use repdf::detect::SourceFormat;
use repdf::error::{Error, Result};
use repdf::{PageDocument, Repdf, SourceFile};

/// Mock codec for testing.
struct MockCodec {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockCodec {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl DocumentCodec for MockCodec {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn mime_type(&self) -> &'static str {
        "application/x-mock"
    }

    fn handles(&self, format: &SourceFormat) -> bool {
        format.is_pdf()
    }

    fn decode(&self, _bytes: &[u8]) -> Result<PageDocument> {
        let mut doc = PageDocument::new();
        doc.metadata.title = Some(format!("Decoded by {}", self.name));
        Ok(doc)
    }

    fn encode(&self, doc: &PageDocument) -> Result<Vec<u8>> {
        Ok(format!("{} pages", doc.page_count()).into_bytes())
    }
}

#[test]
fn test_codec_registry_new() {
    let registry = CodecRegistry::new();
    assert!(registry.supported_extensions().is_empty());
    assert!(!registry.supports("pdf"));
}

#[test]
fn test_codec_registry_with_defaults() {
    let registry = CodecRegistry::with_defaults();
    assert!(registry.supports("pdf"));
    assert!(registry.supports("jpg"));
    assert!(registry.supports("png"));
    assert!(!registry.supports("xlsx"));
}

#[test]
fn test_codec_registry_register_custom() {
    let mut registry = CodecRegistry::new();
    registry.register(Arc::new(MockCodec::new(vec!["mock", "MCK"], "mock")));

    assert!(registry.supports("mock"));
    assert!(registry.supports("mck"));
    assert_eq!(registry.get_by_name("MOCK").unwrap().name(), "mock");
}

#[test]
fn test_later_codec_wins_for_format() {
    let mut registry = CodecRegistry::with_defaults();
    registry.register(Arc::new(MockCodec::new(vec!["mock"], "mock")));

    let doc = registry.decode_bytes(&numbered_pdf(1)).unwrap();
    assert_eq!(doc.metadata.title.as_deref(), Some("Decoded by mock"));
}

#[test]
fn test_facade_uses_custom_registry() {
    let mut registry = CodecRegistry::new();
    registry.register(Arc::new(MockCodec::new(vec!["pdf"], "mock")));

    let sources = vec![
        SourceFile::new("a.pdf", numbered_pdf(1)),
        SourceFile::new("b.pdf", numbered_pdf(1)),
    ];
    let artifact = Repdf::new().with_registry(registry).merge(&sources).unwrap();
    assert_eq!(artifact.bytes(), b"0 pages");
}

#[test]
fn test_decode_source_picks_codec_by_content() {
    let registry = CodecRegistry::with_defaults();

    // the extension lies; content decides
    let source = SourceFile::new("picture.pdf", png_bytes(7, 9));
    let doc = registry.decode_source(&source).unwrap();
    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.pages[0].dimensions(), (7.0, 9.0));
}

#[test]
fn test_pdf_to_image_roundtrip_through_registry() {
    let mut registry = CodecRegistry::new();
    registry.register(Arc::new(PdfCodec::new()));
    registry.register(Arc::new(ImageCodec::new().with_output(ImageOutput::Png)));

    let doc = registry.decode_bytes(&png_bytes(12, 6)).unwrap();
    let pdf = registry.encode(&doc, "pdf").unwrap();
    let again = registry.decode_bytes(&pdf).unwrap();

    assert_eq!(again.page_count(), 1);
    assert_eq!(again.pages[0].dimensions(), (12.0, 6.0));
}

#[test]
fn test_encode_unknown_extension() {
    let registry = CodecRegistry::with_defaults();
    let result = registry.encode(&PageDocument::new(), "docx");
    assert!(matches!(result, Err(Error::Other(_))));
}

#[test]
fn test_inspect_metadata() {
    let source = SourceFile::new("doc.pdf", numbered_pdf(4));
    let metadata = Repdf::new().inspect(&source).unwrap();
    assert_eq!(metadata.page_count, 4);
    assert_eq!(metadata.pdf_version, "1.5");
    assert!(!metadata.encrypted);

    let image = SourceFile::new("a.png", png_bytes(3, 3));
    assert_eq!(Repdf::new().inspect(&image).unwrap().page_count, 1);
}
