//! Raster page content (embedded images and rasterized pages).

use std::fmt;
use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, RgbImage, RgbaImage};

use crate::error::{Error, Result};

/// How the samples of a raster image are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterEncoding {
    /// Baseline/progressive JPEG stream, embedded verbatim
    Jpeg,
    /// Zlib-compressed 8-bit samples
    Flate,
}

impl RasterEncoding {
    /// Name of the matching PDF stream filter.
    pub fn pdf_filter(&self) -> &'static str {
        match self {
            RasterEncoding::Jpeg => "DCTDecode",
            RasterEncoding::Flate => "FlateDecode",
        }
    }
}

/// Color space of the samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// One gray component per pixel
    Gray,
    /// Three RGB components per pixel
    Rgb,
}

impl ColorSpace {
    /// Name of the matching PDF device color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::Gray => "DeviceGray",
            ColorSpace::Rgb => "DeviceRGB",
        }
    }

    /// Components per pixel.
    pub fn components(&self) -> usize {
        match self {
            ColorSpace::Gray => 1,
            ColorSpace::Rgb => 3,
        }
    }
}

/// A raster image ready to be placed on a page.
#[derive(Clone)]
pub struct RasterImage {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Color space of `data`
    pub color_space: ColorSpace,

    /// Storage encoding of `data`
    pub encoding: RasterEncoding,

    /// Encoded sample data
    pub data: Vec<u8>,

    /// Zlib-compressed 8-bit alpha channel, if the image is not opaque
    pub alpha: Option<Vec<u8>>,
}

impl RasterImage {
    /// Wrap JPEG bytes.
    ///
    /// 8-bit baseline, extended and progressive JPEGs in gray or RGB are
    /// kept verbatim. Anything else (CMYK, YCCK, 12-bit, lossless or
    /// arithmetic-coded frames) is decoded and stored losslessly.
    pub fn from_jpeg(bytes: &[u8]) -> Result<Self> {
        match jpeg_header(bytes) {
            Some(header) if !header.is_embeddable() => {
                log::debug!(
                    "JPEG frame SOF{} with {}-bit samples, re-encoding",
                    header.marker - 0xC0,
                    header.precision
                );
            }
            Some(header) if header.width > 0 && header.height > 0 => {
                let color_space = match header.components {
                    1 => Some(ColorSpace::Gray),
                    3 => Some(ColorSpace::Rgb),
                    _ => None,
                };
                if let Some(color_space) = color_space {
                    return Ok(Self {
                        width: header.width,
                        height: header.height,
                        color_space,
                        encoding: RasterEncoding::Jpeg,
                        data: bytes.to_vec(),
                        alpha: None,
                    });
                }
                log::debug!(
                    "JPEG with {} components, re-encoding as RGB",
                    header.components
                );
            }
            _ => {}
        }

        let image = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
        Self::from_dynamic(&image)
    }

    /// Decode PNG bytes into losslessly stored samples.
    pub fn from_png(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        Self::from_dynamic(&image)
    }

    /// Store a decoded image losslessly (Flate).
    ///
    /// An alpha channel that is fully opaque is dropped.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        let color = image.color();
        let (color_space, samples) = if color.has_color() {
            (ColorSpace::Rgb, image.to_rgb8().into_raw())
        } else {
            (ColorSpace::Gray, image.to_luma8().into_raw())
        };

        let alpha = if color.has_alpha() {
            let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p[3]).collect();
            if alpha.iter().all(|&a| a == u8::MAX) {
                None
            } else {
                Some(deflate(&alpha)?)
            }
        } else {
            None
        };

        Ok(Self {
            width: image.width(),
            height: image.height(),
            color_space,
            encoding: RasterEncoding::Flate,
            data: deflate(&samples)?,
            alpha,
        })
    }

    /// Encode a decoded image as JPEG at the given quality (1-100).
    ///
    /// Transparency is discarded.
    pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Self> {
        let quality = quality.clamp(1, 100);
        let mut data = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut data, quality);

        let color_space = if image.color().has_color() {
            encoder.encode_image(&image.to_rgb8())?;
            ColorSpace::Rgb
        } else {
            encoder.encode_image(&image.to_luma8())?;
            ColorSpace::Gray
        };

        Ok(Self {
            width: image.width(),
            height: image.height(),
            color_space,
            encoding: RasterEncoding::Jpeg,
            data,
            alpha: None,
        })
    }

    /// Decode back into pixels.
    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let base = match self.encoding {
            RasterEncoding::Jpeg => image::load_from_memory_with_format(&self.data, ImageFormat::Jpeg)?,
            RasterEncoding::Flate => {
                let samples = inflate(&self.data)?;
                match self.color_space {
                    ColorSpace::Gray => GrayImage::from_raw(self.width, self.height, samples)
                        .map(DynamicImage::ImageLuma8),
                    ColorSpace::Rgb => RgbImage::from_raw(self.width, self.height, samples)
                        .map(DynamicImage::ImageRgb8),
                }
                .ok_or_else(|| Error::Image("sample buffer does not match dimensions".into()))?
            }
        };

        let Some(ref alpha) = self.alpha else {
            return Ok(base);
        };
        let alpha = inflate(alpha)?;
        if alpha.len() != (self.width as usize) * (self.height as usize) {
            return Err(Error::Image("alpha buffer does not match dimensions".into()));
        }

        let image = match self.color_space {
            ColorSpace::Gray => {
                let mut out = GrayAlphaImage::new(self.width, self.height);
                for ((dst, src), a) in out.pixels_mut().zip(base.to_luma8().pixels()).zip(&alpha) {
                    *dst = image::LumaA([src[0], *a]);
                }
                DynamicImage::ImageLumaA8(out)
            }
            ColorSpace::Rgb => {
                let mut out = RgbaImage::new(self.width, self.height);
                for ((dst, src), a) in out.pixels_mut().zip(base.to_rgb8().pixels()).zip(&alpha) {
                    *dst = image::Rgba([src[0], src[1], src[2], *a]);
                }
                DynamicImage::ImageRgba8(out)
            }
        };
        Ok(image)
    }

    /// Get pixel dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size of the encoded data in bytes, alpha included.
    pub fn encoded_len(&self) -> usize {
        self.data.len() + self.alpha.as_ref().map_or(0, Vec::len)
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color_space", &self.color_space)
            .field("encoding", &self.encoding)
            .field("bytes", &self.data.len())
            .field("alpha", &self.alpha.is_some())
            .finish()
    }
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(|e| Error::Image(format!("corrupt sample data: {}", e)))?;
    Ok(out)
}

/// Frame header fields of a JPEG stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegHeader {
    marker: u8,
    precision: u8,
    width: u32,
    height: u32,
    components: u8,
}

impl JpegHeader {
    /// DCTDecode streams must be 8-bit Huffman-coded DCT (SOF0, SOF1, SOF2).
    fn is_embeddable(&self) -> bool {
        self.precision == 8 && matches!(self.marker, 0xC0..=0xC2)
    }
}

/// Walk the marker segments up to the first start-of-frame.
fn jpeg_header(data: &[u8]) -> Option<JpegHeader> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];

        match marker {
            // fill byte
            0xFF => {
                pos += 1;
                continue;
            }
            // markers without a length field
            0x01 | 0xD0..=0xD8 => {
                pos += 2;
                continue;
            }
            // scan data or end of image before any frame header
            0xD9 | 0xDA => return None,
            _ => {}
        }

        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if len < 2 {
            return None;
        }

        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            // precision, height, width, component count
            let segment = data.get(pos + 4..pos + 2 + len)?;
            if segment.len() < 6 {
                return None;
            }
            return Some(JpegHeader {
                marker,
                precision: segment[0],
                height: u16::from_be_bytes([segment[1], segment[2]]) as u32,
                width: u16::from_be_bytes([segment[3], segment[4]]) as u32,
                components: segment[5],
            });
        }

        pos += 2 + len;
    }

    None
}
