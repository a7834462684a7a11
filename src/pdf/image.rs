//! # Image fields
//!
//! Turns a field's `data:image/...;base64,` payload into an image XObject.
//! JPEG data passes through untouched (PDF reads it natively via DCTDecode).
//! PNG data is decoded to RGB pixels, with a separate alpha channel written
//! as an SMask when the image is not fully opaque.
//!
//! Anything wrong with a single payload is a [`SkipReason`]: the field is
//! left out and flattening carries on.

use std::io::{Cursor, Write};
use std::path::Path;

use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::ImageFormat;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::field::Size;

/// Why an image field was left out of the flattened document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("image field has no content")]
    MissingContent,

    #[error("image data has no base64 payload after the comma")]
    MissingPayload,

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid base64 image data: {0}")]
    InvalidBase64(String),

    #[error("image data does not decode as {format}: {message}")]
    UndecodableImage { format: &'static str, message: String },
}

/// Image formats a field may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredFormat {
    Png,
    Jpeg,
}

impl DeclaredFormat {
    /// Recognise the MIME marker at the start of a data URI
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        if uri.starts_with("data:image/png") {
            Some(DeclaredFormat::Png)
        } else if uri.starts_with("data:image/jpeg") || uri.starts_with("data:image/jpg") {
            Some(DeclaredFormat::Jpeg)
        } else {
            None
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DeclaredFormat::Png => "PNG",
            DeclaredFormat::Jpeg => "JPEG",
        }
    }
}

/// JPEG color space for the PDF /ColorSpace entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
}

impl JpegColorSpace {
    fn pdf_name(&self) -> &'static str {
        match self {
            JpegColorSpace::DeviceGray => "DeviceGray",
            JpegColorSpace::DeviceRGB => "DeviceRGB",
            JpegColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// Pixel data in a shape the PDF writer can take directly
#[derive(Debug, Clone)]
pub enum ImagePixels {
    /// Raw JPEG bytes, embedded with DCTDecode
    Jpeg { data: Vec<u8>, color_space: JpegColorSpace },
    /// RGB pixels plus an alpha channel when any pixel is not opaque
    Decoded { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

/// A decoded field image
#[derive(Debug, Clone)]
pub struct FieldImage {
    pub pixels: ImagePixels,
    pub width_px: u32,
    pub height_px: u32,
}

impl FieldImage {
    /// Intrinsic size, one unit per pixel
    pub fn intrinsic_size(&self) -> Size {
        Size::new(self.width_px as f32, self.height_px as f32)
    }
}

/// Decode the image payload of a field's content
pub fn load_field_image(content: Option<&str>) -> std::result::Result<FieldImage, SkipReason> {
    let uri = content.ok_or(SkipReason::MissingContent)?;

    let payload = match uri.split_once(',') {
        Some((_, payload)) if !payload.is_empty() => payload,
        _ => return Err(SkipReason::MissingPayload),
    };

    let format = DeclaredFormat::from_data_uri(uri)
        .ok_or_else(|| SkipReason::UnsupportedFormat(mime_of(uri).to_string()))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| SkipReason::InvalidBase64(e.to_string()))?;

    let decoded = match format {
        DeclaredFormat::Jpeg => decode_jpeg(&bytes),
        DeclaredFormat::Png => decode_png(&bytes),
    };
    decoded.map_err(|message| SkipReason::UndecodableImage { format: format.name(), message })
}

/// The MIME part of a data URI, for diagnostics
fn mime_of(uri: &str) -> &str {
    let rest = uri.strip_prefix("data:").unwrap_or(uri);
    rest.split([';', ',']).next().unwrap_or(rest)
}

/// JPEG: read dimensions and color space without decoding pixels
fn decode_jpeg(data: &[u8]) -> std::result::Result<FieldImage, String> {
    let (width, height) = image::io::Reader::with_format(Cursor::new(data), ImageFormat::Jpeg)
        .into_dimensions()
        .map_err(|e| e.to_string())?;

    Ok(FieldImage {
        pixels: ImagePixels::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the SOF segment and read its component count
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2; // skip SOI marker (FF D8)
    while i + 3 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        // SOF markers: C0-C3, C5-C7, C9-CB, CD-CF
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            // length(2) + precision(1) + height(2) + width(2) + components(1)
            return match data[i + 9] {
                1 => JpegColorSpace::DeviceGray,
                4 => JpegColorSpace::DeviceCMYK,
                _ => JpegColorSpace::DeviceRGB,
            };
        }
        let segment_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + segment_len;
    }
    JpegColorSpace::DeviceRGB
}

/// PNG: decode to RGBA, split into RGB + alpha
fn decode_png(data: &[u8]) -> std::result::Result<FieldImage, String> {
    let rgba = image::load_from_memory_with_format(data, ImageFormat::Png)
        .map_err(|e| e.to_string())?
        .to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }
    let opaque = alpha.iter().all(|&a| a == 255);

    Ok(FieldImage {
        pixels: ImagePixels::Decoded {
            rgb,
            alpha: if opaque { None } else { Some(alpha) },
        },
        width_px: width,
        height_px: height,
    })
}

fn zlib(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Add an image XObject (and its SMask, if any) to the document
pub fn embed_image(doc: &mut Document, image: &FieldImage) -> Result<ObjectId> {
    let width = image.width_px as i64;
    let height = image.height_px as i64;

    let stream = match &image.pixels {
        ImagePixels::Jpeg { data, color_space } => {
            let mut dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => color_space.pdf_name(),
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            };
            // CMYK JPEGs are stored inverted (Adobe APP14 convention)
            if *color_space == JpegColorSpace::DeviceCMYK {
                let decode: Vec<Object> = [1, 0, 1, 0, 1, 0, 1, 0].iter().map(|&v| Object::Integer(v)).collect();
                dict.set("Decode", Object::Array(decode));
            }
            Stream::new(dict, data.clone())
        }
        ImagePixels::Decoded { rgb, alpha } => {
            let mut dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            };
            if let Some(alpha) = alpha {
                let smask = Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => width,
                        "Height" => height,
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => 8,
                        "Filter" => "FlateDecode",
                    },
                    zlib(alpha)?,
                );
                let smask_id = doc.add_object(smask.with_compression(false));
                dict.set("SMask", Object::Reference(smask_id));
            }
            Stream::new(dict, zlib(rgb)?)
        }
    };

    Ok(doc.add_object(stream.with_compression(false)))
}

/// Build a data URI from raw image bytes, the way an upload would
///
/// No validation happens here; flattening decides what is usable.
pub fn image_data_uri(bytes: &[u8], mime: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, encoded)
}

/// Read an image file into a data URI, guessing the MIME type from its extension
pub fn image_data_uri_from_path(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    let mime = match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    Ok(image_data_uri(&bytes, mime))
}
