//! PDF codec using lopdf.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document as LoDocument, Object, ObjectId, Stream, StringFormat};

use crate::detect::{detect_pdf_from_bytes, SourceFormat};
use crate::error::{Error, Result};
use crate::model::{normalize_rotation, Metadata, Page, PageContent, PageDocument, RasterImage, VectorPage};

use super::graph::{inherited_attribute, resolve, PageImporter};
use super::DocumentCodec;

/// Default page size (US Letter) for pages without a usable MediaBox.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Name written to the `/Producer` entry of encoded documents.
const PRODUCER: &str = concat!("repdf ", env!("CARGO_PKG_VERSION"));

/// PDF codec.
///
/// Decoding keeps each page as a reference into the parsed source, so
/// merge and split never re-render content. Encoding builds a fresh
/// document from those references and from raster pages.
#[derive(Debug, Clone)]
pub struct PdfCodec {
    version: String,
    compress_streams: bool,
}

impl PdfCodec {
    /// Create a PDF codec writing PDF 1.7 with compressed streams.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the version written to the output header.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Enable or disable Flate compression of unfiltered streams on encode.
    pub fn with_stream_compression(mut self, enabled: bool) -> Self {
        self.compress_streams = enabled;
        self
    }

    /// Parse a PDF into a lopdf document, rejecting encrypted files.
    pub(crate) fn load(bytes: &[u8]) -> Result<LoDocument> {
        detect_pdf_from_bytes(bytes)?;

        let doc = LoDocument::load_mem(bytes).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;

        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(doc)
    }

    fn write_info(&self, out: &mut LoDocument, metadata: &Metadata) -> ObjectId {
        let mut info = Dictionary::new();
        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
            ("Creator", &metadata.creator),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text_string(value));
            }
        }
        info.set("Producer", text_string(PRODUCER));

        let now = Utc::now();
        let created = metadata.created.unwrap_or(now);
        info.set("CreationDate", Object::string_literal(format_pdf_date(&created)));
        info.set("ModDate", Object::string_literal(format_pdf_date(&now)));

        out.add_object(info)
    }
}

impl Default for PdfCodec {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            compress_streams: true,
        }
    }
}

impl DocumentCodec for PdfCodec {
    fn name(&self) -> &str {
        "pdf"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn mime_type(&self) -> &'static str {
        "application/pdf"
    }

    fn handles(&self, format: &SourceFormat) -> bool {
        format.is_pdf()
    }

    fn decode(&self, bytes: &[u8]) -> Result<PageDocument> {
        let doc = Self::load(bytes)?;
        let mut metadata = extract_metadata(&doc);

        let doc = Arc::new(doc);
        let page_ids = doc.get_pages();
        let mut pages = Vec::with_capacity(page_ids.len());

        for (&number, &page_id) in page_ids.iter() {
            let dict = doc.get_dictionary(page_id).map_err(|e| {
                Error::Corrupted(format!("page {} ({:?}): {}", number, page_id, e))
            })?;
            let (width, height) = page_dimensions(&doc, dict);

            let mut page = Page::vector(width, height, VectorPage::new(Arc::clone(&doc), page_id, number));
            page.rotation = page_rotation(&doc, dict);
            pages.push(page);
        }

        if pages.is_empty() {
            log::warn!("PDF has no pages");
        }
        metadata.page_count = pages.len() as u32;
        log::debug!("Decoded PDF {} with {} pages", metadata.pdf_version, pages.len());

        Ok(PageDocument { metadata, pages })
    }

    fn encode(&self, doc: &PageDocument) -> Result<Vec<u8>> {
        if doc.is_empty() {
            return Err(Error::Encoding("document has no pages".into()));
        }

        let mut out = LoDocument::with_version(self.version.as_str());
        let pages_id = out.new_object_id();
        let mut kids = Vec::with_capacity(doc.pages.len());

        {
            let mut importer = PageImporter::new(&mut out, pages_id);
            // all vector pages get their ids first so cross-page links resolve
            let reserved: Vec<Option<ObjectId>> = doc
                .pages
                .iter()
                .map(|page| page.vector_page().map(|vp| importer.reserve(vp)))
                .collect();

            for (page, reserved) in doc.pages.iter().zip(reserved) {
                let page_id = match (&page.content, reserved) {
                    (PageContent::Vector(vp), Some(id)) => {
                        importer.import(id, vp, page.rotation)?;
                        id
                    }
                    (PageContent::Raster(image), _) => {
                        write_raster_page(importer.target(), pages_id, page, image)?
                    }
                    (PageContent::Vector(_), None) => {
                        return Err(Error::Encoding("vector page without an object id".into()))
                    }
                };
                kids.push(Object::Reference(page_id));
            }
        }

        let count = kids.len() as i64;
        out.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = out.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        out.trailer.set("Root", catalog_id);
        let info_id = self.write_info(&mut out, &doc.metadata);
        out.trailer.set("Info", info_id);

        if self.compress_streams {
            out.compress();
        }

        let mut buffer = Vec::new();
        out.save_to(&mut buffer)
            .map_err(|e| Error::Encoding(format!("failed to write PDF: {}", e)))?;

        log::debug!("Encoded {} pages into {} bytes", count, buffer.len());
        Ok(buffer)
    }
}

/// Write a page that draws `image` over its whole media box.
fn write_raster_page(
    out: &mut LoDocument,
    parent: ObjectId,
    page: &Page,
    image: &RasterImage,
) -> Result<ObjectId> {
    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => image.color_space.pdf_name(),
        "BitsPerComponent" => 8,
        "Filter" => image.encoding.pdf_filter(),
    };

    if let Some(ref alpha) = image.alpha {
        let mask = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width as i64,
            "Height" => image.height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        let mask_id = out.add_object(encoded_stream(mask, alpha.clone()));
        image_dict.set("SMask", mask_id);
    }
    let image_id = out.add_object(encoded_stream(image_dict, image.data.clone()));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    number(page.width),
                    0.into(),
                    0.into(),
                    number(page.height),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|e| Error::Encoding(format!("page content: {}", e)))?;
    let content_id = out.add_object(Stream::new(dictionary! {}, content_bytes));

    let mut page_dict = dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![0.into(), 0.into(), number(page.width), number(page.height)],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    };
    if page.rotation != 0 {
        page_dict.set("Rotate", page.rotation as i64);
    }

    Ok(out.add_object(page_dict))
}

/// A stream whose data is already encoded with the filter named in `dict`.
fn encoded_stream(dict: Dictionary, data: Vec<u8>) -> Stream {
    let mut stream = Stream::new(dict, data);
    stream.allows_compression = false;
    stream
}

fn number(value: f32) -> Object {
    if value.fract() == 0.0 {
        Object::Integer(value as i64)
    } else {
        Object::Real(value)
    }
}

/// Size of the visible page area: the CropBox clipped to the MediaBox,
/// both possibly inherited. Falls back to the MediaBox when the CropBox
/// is missing or does not overlap it.
fn page_dimensions(doc: &LoDocument, page: &Dictionary) -> (f32, f32) {
    let Some(media_box) = page_box(doc, page, b"MediaBox") else {
        return DEFAULT_PAGE_SIZE;
    };
    let visible = page_box(doc, page, b"CropBox")
        .and_then(|crop_box| intersect_boxes(media_box, crop_box))
        .unwrap_or(media_box);

    (visible[2] - visible[0], visible[3] - visible[1])
}

/// A page rectangle as `[left, bottom, right, top]`, normalized so that
/// left < right and bottom < top. Degenerate rectangles are ignored.
fn page_box(doc: &LoDocument, page: &Dictionary, key: &[u8]) -> Option<[f32; 4]> {
    let values = resolve(doc, inherited_attribute(doc, page, key)?).as_array().ok()?;
    if values.len() < 4 {
        return None;
    }

    let coords: Vec<f32> = values
        .iter()
        .take(4)
        .filter_map(|v| resolve(doc, v).as_float().ok())
        .collect();
    match coords.as_slice() {
        &[x0, y0, x1, y1] => {
            let rect = [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)];
            (rect[2] > rect[0] && rect[3] > rect[1]).then_some(rect)
        }
        _ => None,
    }
}

fn intersect_boxes(a: [f32; 4], b: [f32; 4]) -> Option<[f32; 4]> {
    let rect = [a[0].max(b[0]), a[1].max(b[1]), a[2].min(b[2]), a[3].min(b[3])];
    (rect[2] > rect[0] && rect[3] > rect[1]).then_some(rect)
}

/// Read the document information dictionary.
fn extract_metadata(doc: &LoDocument) -> Metadata {
    let mut metadata = Metadata::with_version(doc.version.to_string());

    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .map(|info| resolve(doc, info))
        .and_then(|info| info.as_dict().ok());

    if let Some(info) = info {
        metadata.title = get_string_from_dict(doc, info, b"Title");
        metadata.author = get_string_from_dict(doc, info, b"Author");
        metadata.subject = get_string_from_dict(doc, info, b"Subject");
        metadata.keywords = get_string_from_dict(doc, info, b"Keywords");
        metadata.creator = get_string_from_dict(doc, info, b"Creator");
        metadata.producer = get_string_from_dict(doc, info, b"Producer");

        if let Some(date_str) = get_string_from_dict(doc, info, b"CreationDate") {
            metadata.created = parse_pdf_date(&date_str);
        }
        if let Some(date_str) = get_string_from_dict(doc, info, b"ModDate") {
            metadata.modified = parse_pdf_date(&date_str);
        }
    }

    metadata.encrypted = doc.is_encrypted();
    metadata
}

/// Helper to get a text string from a PDF dictionary.
fn get_string_from_dict(doc: &LoDocument, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let value = resolve(doc, dict.get(key).ok()?);
    let text = match value {
        Object::String(bytes, _) => {
            // UTF-16BE with byte order mark
            if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&utf16).ok()
            } else {
                // UTF-8, else Latin-1
                String::from_utf8(bytes.clone())
                    .ok()
                    .or_else(|| Some(bytes.iter().map(|&b| b as char).collect()))
            }
        }
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    };
    text.filter(|s| !s.trim().is_empty())
}

/// Encode a text string, using UTF-16BE when it is not plain ASCII.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        Object::string_literal(s)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in s.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    // At minimum we need YYYY
    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}

fn format_pdf_date(date: &DateTime<Utc>) -> String {
    date.format("D:%Y%m%d%H%M%SZ").to_string()
}

/// Rotation of a page in a parsed document.
fn page_rotation(doc: &LoDocument, page: &Dictionary) -> u16 {
    let rotation = inherited_attribute(doc, page, b"Rotate")
        .and_then(|r| resolve(doc, r).as_i64().ok())
        .unwrap_or(0);
    normalize_rotation(rotation)
}
