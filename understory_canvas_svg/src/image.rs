// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Embedding images as `data:` URIs.

use std::borrow::Cow;

use base64::Engine as _;
use png::{BitDepth, ColorType, Compression, Encoder};
use understory_canvas::{Bitmap, Image, ImageAlphaType};

const PNG_DATA_PREFIX: &str = "data:image/png;base64,";
const JPEG_DATA_PREFIX: &str = "data:image/jpeg;base64,";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const JPEG_SIGNATURE: [u8; 3] = [0xff, 0xd8, 0xff];

/// Encoding quality for images without usable encoded data.
const IMAGE_QUALITY: u8 = 100;
/// Encoding quality for raw bitmaps.
const BITMAP_QUALITY: u8 = 80;

/// Why an image could not be embedded.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The image has no pixels.
    #[error("image is empty")]
    Empty,
    /// The pixel buffer does not match the image dimensions.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize {
        /// Bytes required by the dimensions.
        expected: usize,
        /// Bytes present.
        actual: usize,
    },
    /// The PNG encoder failed.
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// Returns `true` if `data` starts with the PNG signature.
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

/// Returns `true` if `data` starts with a JPEG start-of-image marker.
pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&JPEG_SIGNATURE)
}

/// A `data:` URI for `image`.
///
/// Encoded PNG or JPEG data attached to the image is embedded as is;
/// otherwise the pixels are encoded as PNG.
pub fn image_data_uri(image: &Image) -> Result<String, EncodeError> {
    match image.encoded_data() {
        Some(data) if is_jpeg(data) => Ok(data_uri(JPEG_DATA_PREFIX, data)),
        Some(data) if is_png(data) => Ok(data_uri(PNG_DATA_PREFIX, data)),
        _ => {
            let png = encode_png(image.bitmap(), IMAGE_QUALITY)?;
            Ok(data_uri(PNG_DATA_PREFIX, &png))
        }
    }
}

/// A PNG `data:` URI for a raw bitmap.
pub fn bitmap_data_uri(bitmap: &Bitmap) -> Result<String, EncodeError> {
    let png = encode_png(bitmap, BITMAP_QUALITY)?;
    Ok(data_uri(PNG_DATA_PREFIX, &png))
}

/// Encode `bitmap` as an RGBA8 PNG.
///
/// `quality` selects the compression effort: 100 and above compress best.
pub fn encode_png(bitmap: &Bitmap, quality: u8) -> Result<Vec<u8>, EncodeError> {
    if bitmap.is_empty() {
        return Err(EncodeError::Empty);
    }
    let expected = bitmap.expected_len();
    let actual = bitmap.pixels().len();
    if expected != actual {
        return Err(EncodeError::BufferSize { expected, actual });
    }

    let pixels = match bitmap.alpha_type() {
        ImageAlphaType::Alpha => Cow::Borrowed(bitmap.pixels()),
        ImageAlphaType::AlphaPremultiplied => Cow::Owned(unpremultiply(bitmap.pixels())),
    };

    let mut out = Vec::new();
    {
        let mut encoder = Encoder::new(&mut out, bitmap.width(), bitmap.height());
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        encoder.set_compression(if quality >= 100 {
            Compression::Best
        } else {
            Compression::Default
        });
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&pixels)?;
        writer.finish()?;
    }

    if out.is_empty() {
        return Err(EncodeError::Empty);
    }
    Ok(out)
}

fn data_uri(prefix: &str, data: &[u8]) -> String {
    let mut uri = String::from(prefix);
    base64::engine::general_purpose::STANDARD.encode_string(data, &mut uri);
    uri
}

fn unpremultiply(pixels: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len());
    for px in pixels.chunks_exact(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        for &c in &px[..3] {
            let straight = ((u16::from(c) * 255 + a / 2) / a).min(255);
            #[allow(clippy::cast_possible_truncation, reason = "clamped to 255 above")]
            out.push(straight as u8);
        }
        out.push(px[3]);
    }
    out
}
