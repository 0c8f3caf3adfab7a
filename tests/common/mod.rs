//! Shared fixtures for integration tests.
//!
//! Documents are built in memory with lopdf and the image crate.

#![allow(dead_code)]

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use repdf::error::{Error, Result};
use repdf::PageRasterizer;

/// A page of a fixture PDF.
pub struct PageSpec {
    pub width: i64,
    pub height: i64,
    pub rotate: i64,
    pub crop_box: Option<[i64; 4]>,
    pub text: String,
}

impl PageSpec {
    pub fn new(width: i64, height: i64, text: impl Into<String>) -> Self {
        Self {
            width,
            height,
            rotate: 0,
            crop_box: None,
            text: text.into(),
        }
    }

    pub fn rotated(mut self, degrees: i64) -> Self {
        self.rotate = degrees;
        self
    }

    pub fn cropped(mut self, crop_box: [i64; 4]) -> Self {
        self.crop_box = Some(crop_box);
        self
    }
}

/// Build a PDF whose pages draw their text with a shared Helvetica font.
pub fn pdf_with_pages(pages: &[PageSpec]) -> Vec<u8> {
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

    let mut kids: Vec<Object> = Vec::new();
    for spec in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![36.into(), 36.into()]),
                Operation::new("Tj", vec![Object::string_literal(spec.text.as_str())]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), spec.width.into(), spec.height.into()],
        };
        if spec.rotate != 0 {
            page.set("Rotate", spec.rotate);
        }
        if let Some(crop_box) = spec.crop_box {
            page.set("CropBox", crop_box.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>());
        }
        kids.push(doc.add_object(page).into());
    }

    finish(doc, pages_id, kids)
}

/// Build an N-page letter-size PDF where page `n` reads "Page n".
pub fn numbered_pdf(count: u32) -> Vec<u8> {
    let pages: Vec<PageSpec> = (1..=count)
        .map(|n| PageSpec::new(612, 792, format!("Page {}", n)))
        .collect();
    pdf_with_pages(&pages)
}

/// Build a PDF with one page showing a large noise image stored losslessly.
pub fn noise_pdf(width: u32, height: u32) -> Vec<u8> {
    let samples = noise_image(width, height).to_rgb8().into_raw();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        samples,
    );
    image.compress().unwrap();
    let image_id = doc.add_object(image);

    let content = format!("q {} 0 0 {} 0 0 cm /Im0 Do Q", width, height);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "MediaBox" => vec![0.into(), 0.into(), (width as i64).into(), (height as i64).into()],
    });

    finish(doc, pages_id, vec![page_id.into()])
}

fn finish(mut doc: Document, pages_id: lopdf::ObjectId, kids: Vec<Object>) -> Vec<u8> {
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
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

/// Deterministic pseudo-random RGB noise.
pub fn noise_image(width: u32, height: u32) -> DynamicImage {
    let mut state: u32 = 0x2545_F491;
    let image = RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xFF) as u8
        };
        Rgb([next(), next(), next()])
    });
    DynamicImage::ImageRgb8(image)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([20, 120, 220])));
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

pub fn transparent_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 64])));
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 85)
        .encode_image(&RgbImage::from_pixel(width, height, Rgb([200, 200, 40])))
        .unwrap();
    buf
}

/// Renders each page as noise at the displayed size of its visible box
/// (CropBox, else MediaBox) times `scale`, as pdfium does.
pub struct NoiseRasterizer;

impl PageRasterizer for NoiseRasterizer {
    fn name(&self) -> &str {
        "noise"
    }

    fn rasterize(&self, pdf: &[u8], scale: f32) -> Result<Vec<DynamicImage>> {
        let doc = Document::load_mem(pdf)?;
        doc.get_pages()
            .values()
            .map(|&id| -> Result<DynamicImage> {
                let dict = doc.get_dictionary(id)?;
                let visible = dict.get(b"CropBox").or_else(|_| dict.get(b"MediaBox"))?.as_array()?;
                let w = visible[2].as_float()? - visible[0].as_float()?;
                let h = visible[3].as_float()? - visible[1].as_float()?;
                let rotate = dict.get(b"Rotate").and_then(Object::as_i64).unwrap_or(0);
                let (w, h) = if rotate % 180 == 0 { (w, h) } else { (h, w) };
                Ok(noise_image(
                    ((w * scale).round() as u32).max(1),
                    ((h * scale).round() as u32).max(1),
                ))
            })
            .collect()
    }
}

/// Fails on the given 1-based page.
pub struct FailingRasterizer(pub u32);

impl PageRasterizer for FailingRasterizer {
    fn name(&self) -> &str {
        "failing"
    }

    fn rasterize(&self, _pdf: &[u8], _scale: f32) -> Result<Vec<DynamicImage>> {
        Err(Error::Rasterize {
            page: self.0,
            detail: "renderer crashed".into(),
        })
    }
}

/// Text drawn on each page of a PDF, via lopdf.
pub fn page_texts(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    let count = doc.get_pages().len() as u32;
    (1..=count)
        .map(|n| doc.extract_text(&[n]).unwrap().trim().to_string())
        .collect()
}

/// (width, height) of each page's MediaBox.
pub fn page_sizes(pdf: &[u8]) -> Vec<(f32, f32)> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let dict = doc.get_dictionary(id).unwrap();
            let media_box = dict.get(b"MediaBox").unwrap().as_array().unwrap();
            (
                media_box[2].as_float().unwrap() - media_box[0].as_float().unwrap(),
                media_box[3].as_float().unwrap() - media_box[1].as_float().unwrap(),
            )
        })
        .collect()
}
