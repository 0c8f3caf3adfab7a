//! Benchmarks for repdf transforms.
//!
//! Run with: cargo bench
//!
//! These benchmarks test merge, split and range parsing with synthetic PDF
//! data built by lopdf.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use repdf::{PageRange, Repdf, SourceFile};

/// Creates a synthetic PDF with the given number of text pages.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for i in 0..page_count {
        let text = format!("Page {} - Benchmark test content for repdf.", i + 1);
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Benchmark page range parsing.
fn bench_range_parsing(c: &mut Criterion) {
    c.bench_function("parse_range", |b| {
        b.iter(|| PageRange::parse(black_box("1-10, 15, 20-40, 7, 99")).unwrap());
    });
}

/// Benchmark merging at various sizes.
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for page_count in [1, 10, 50].iter() {
        let sources = vec![
            SourceFile::new("a.pdf", create_test_pdf(*page_count)),
            SourceFile::new("b.pdf", create_test_pdf(*page_count)),
        ];

        group.bench_function(format!("2x{}_pages", page_count), |b| {
            b.iter(|| Repdf::new().merge(black_box(&sources)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark page selection.
fn bench_split(c: &mut Criterion) {
    let source = SourceFile::new("big.pdf", create_test_pdf(100));
    let range = PageRange::parse("1-10,50,90-100").unwrap();

    c.bench_function("split_100_pages", |b| {
        b.iter(|| Repdf::new().split(black_box(&source), &range).unwrap());
    });
}

criterion_group!(benches, bench_range_parsing, bench_merge, bench_split);
criterion_main!(benches);
