//! Integration tests for rasterize-recompress.
//!
//! Rendering is done by mock rasterizers so no pdfium library is needed.

mod common;

use common::{noise_pdf, numbered_pdf, page_sizes, pdf_with_pages, FailingRasterizer, NoiseRasterizer, PageSpec};
use lopdf::Document;
use repdf::{CompressOptions, Error, Repdf, SourceFile, COMPRESSED_FILENAME};

fn compress(pdf: Vec<u8>, options: &CompressOptions) -> repdf::Result<repdf::OutputArtifact> {
    Repdf::new()
        .with_rasterizer(NoiseRasterizer)
        .compress_with(&SourceFile::new("in.pdf", pdf), options)
}

#[test]
fn test_compress_shrinks_image_heavy_pdf() {
    let input = noise_pdf(600, 600);
    let options = CompressOptions::new().with_scale(0.5).with_quality(0.5);
    let output = compress(input.clone(), &options).unwrap();

    assert_eq!(output.filename(), COMPRESSED_FILENAME);
    assert!(
        output.len() < input.len(),
        "expected {} < {}",
        output.len(),
        input.len()
    );
}

#[test]
fn test_compress_removes_text_layer() {
    let input = numbered_pdf(2);
    let output = compress(input, &CompressOptions::default()).unwrap();

    let doc = Document::load_mem(output.bytes()).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
    for page in 1..=2 {
        let text = doc.extract_text(&[page]).unwrap_or_default();
        assert!(!text.contains("Page"), "page {} still has text: {:?}", page, text);
    }
}

#[test]
fn test_compress_pages_hold_one_jpeg() {
    let output = compress(numbered_pdf(1), &CompressOptions::default()).unwrap();
    let doc = Document::load_mem(output.bytes()).unwrap();

    let images: Vec<_> = doc
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name_str())
                .map_or(false, |s| s == "Image")
        })
        .collect();
    assert_eq!(images.len(), 1);
    let filter = images[0].dict.get(b"Filter").unwrap().as_name_str().unwrap();
    assert_eq!(filter, "DCTDecode");
}

#[test]
fn test_compress_keeps_page_sizes() {
    let input = pdf_with_pages(&[
        PageSpec::new(612, 792, "portrait"),
        PageSpec::new(600, 300, "turned").rotated(90),
    ]);
    let output = compress(input, &CompressOptions::new().with_scale(0.3)).unwrap();

    // the rotated page is rendered upright, so its box is swapped
    assert_eq!(page_sizes(output.bytes()), vec![(612.0, 792.0), (300.0, 600.0)]);
}

#[test]
fn test_compress_page_failure_aborts() {
    let result = Repdf::new()
        .with_rasterizer(FailingRasterizer(2))
        .compress_with(&SourceFile::new("in.pdf", numbered_pdf(3)), &CompressOptions::default());
    assert!(matches!(result, Err(Error::Rasterize { page: 2, .. })));
}

#[test]
fn test_compress_rejects_image_input() {
    let result = compress(common::png_bytes(10, 10), &CompressOptions::default());
    assert!(matches!(result, Err(Error::UnexpectedFormat { .. })));
}

#[test]
fn test_compress_sequential_matches_parallel_page_count() {
    let input = numbered_pdf(4);
    let parallel = compress(input.clone(), &CompressOptions::default()).unwrap();
    let sequential = compress(input, &CompressOptions::default().sequential()).unwrap();

    assert_eq!(page_sizes(parallel.bytes()), page_sizes(sequential.bytes()));
}

#[test]
fn test_compress_uses_visible_crop_area() {
    let input = pdf_with_pages(&[PageSpec::new(600, 800, "cropped").cropped([0, 0, 300, 400])]);
    let output = compress(input, &CompressOptions::new().with_scale(1.0)).unwrap();

    assert_eq!(page_sizes(output.bytes()), vec![(300.0, 400.0)]);

    // one image pixel per point, so the render is not stretched
    let doc = Document::load_mem(output.bytes()).unwrap();
    let image = doc
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .find(|stream| stream.dict.get(b"Subtype").and_then(|s| s.as_name_str()).map_or(false, |s| s == "Image"))
        .unwrap();
    assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 300);
    assert_eq!(image.dict.get(b"Height").unwrap().as_i64().unwrap(), 400);
}
