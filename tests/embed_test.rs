//! Integration tests for image embedding.

mod common;

use common::{jpeg_bytes, numbered_pdf, page_sizes, png_bytes, transparent_png_bytes};
use lopdf::Document;
use repdf::{images_to_pdf, Error, Repdf, SourceFile, IMAGES_FILENAME};
use std::fs;
use tempfile::TempDir;

fn image_streams(pdf: &[u8]) -> Vec<lopdf::Stream> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name_str())
                .map_or(false, |s| s == "Image")
        })
        .cloned()
        .collect()
}

#[test]
fn test_embed_page_per_image_at_pixel_size() {
    let sources = vec![
        SourceFile::new("landscape.jpg", jpeg_bytes(800, 600)),
        SourceFile::new("tall.png", png_bytes(120, 500)),
        SourceFile::new("square.jpg", jpeg_bytes(64, 64)),
    ];
    let artifact = Repdf::new().images(&sources).unwrap();

    assert_eq!(artifact.filename(), IMAGES_FILENAME);
    assert_eq!(
        page_sizes(artifact.bytes()),
        vec![(800.0, 600.0), (120.0, 500.0), (64.0, 64.0)]
    );
}

#[test]
fn test_embed_jpeg_is_not_reencoded() {
    let jpeg = jpeg_bytes(40, 30);
    let artifact = Repdf::new()
        .images(&[SourceFile::new("photo.jpg", jpeg.clone())])
        .unwrap();

    let streams = image_streams(artifact.bytes());
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].dict.get(b"Filter").unwrap().as_name_str().unwrap(), "DCTDecode");
    assert_eq!(streams[0].content, jpeg);
}

#[test]
fn test_embed_png_with_alpha_gets_soft_mask() {
    let artifact = Repdf::new()
        .images(&[SourceFile::new("overlay.png", transparent_png_bytes(16, 8))])
        .unwrap();

    let streams = image_streams(artifact.bytes());
    // color image plus its mask
    assert_eq!(streams.len(), 2);
    assert!(streams.iter().any(|s| s.dict.has(b"SMask")));
}

#[test]
fn test_embed_no_input() {
    assert!(matches!(Repdf::new().images(&[]), Err(Error::NoInput)));
}

#[test]
fn test_embed_rejects_pdf_input() {
    let sources = vec![
        SourceFile::new("ok.png", png_bytes(4, 4)),
        SourceFile::new("doc.pdf", numbered_pdf(1)),
    ];
    match Repdf::new().images(&sources) {
        Err(Error::UnsupportedImage { name, mime }) => {
            assert_eq!(name, "doc.pdf");
            assert_eq!(mime, "application/pdf");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_embed_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("picture.webp");
    fs::write(&path, b"RIFF\x00\x00\x00\x00WEBPVP8 ").unwrap();

    match images_to_pdf(&[&path]) {
        Err(Error::UnsupportedImage { name, mime }) => {
            assert_eq!(name, "picture.webp");
            assert_eq!(mime, "image/webp");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_images_to_pdf_from_disk() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.jpg");
    fs::write(&a, png_bytes(30, 20)).unwrap();
    fs::write(&b, jpeg_bytes(10, 50)).unwrap();

    let artifact = images_to_pdf(&[&a, &b]).unwrap();
    assert_eq!(page_sizes(artifact.bytes()), vec![(30.0, 20.0), (10.0, 50.0)]);
}
