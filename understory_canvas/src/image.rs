// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::sync::Arc;
use core::fmt;

use crate::ImageAlphaType;

/// An RGBA8 pixel buffer.
///
/// Pixels are stored row-major, four bytes per pixel, with no row padding.
/// Storage is shared: cloning a bitmap does not copy pixels.
#[derive(Clone, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    alpha_type: ImageAlphaType,
    pixels: Arc<[u8]>,
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("alpha_type", &self.alpha_type)
            .field("pixels", &format_args!("[{} bytes]", self.pixels.len()))
            .finish()
    }
}

impl Bitmap {
    /// Create a bitmap from straight-alpha RGBA8 pixels.
    ///
    /// The buffer length is not validated here; encoders report a mismatch.
    pub fn new(width: u32, height: u32, pixels: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            alpha_type: ImageAlphaType::Alpha,
            pixels: pixels.into(),
        }
    }

    /// Returns this bitmap with a different alpha interpretation.
    #[inline]
    pub fn with_alpha_type(mut self, alpha_type: ImageAlphaType) -> Self {
        self.alpha_type = alpha_type;
        self
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// How the color channels relate to alpha.
    #[inline]
    pub fn alpha_type(&self) -> ImageAlphaType {
        self.alpha_type
    }

    /// Raw RGBA8 pixel bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of bytes a buffer of this size must hold.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An image: decoded pixels plus, optionally, the bytes they were decoded from.
///
/// Devices that can embed encoded data directly (PNG or JPEG) prefer
/// [`Image::encoded_data`] over re-encoding the pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    bitmap: Bitmap,
    encoded: Option<Arc<[u8]>>,
}

impl From<Bitmap> for Image {
    fn from(bitmap: Bitmap) -> Self {
        Self {
            bitmap,
            encoded: None,
        }
    }
}

impl Image {
    /// Attach the encoded bytes this image was decoded from.
    pub fn with_encoded_data(mut self, data: impl Into<Arc<[u8]>>) -> Self {
        self.encoded = Some(data.into());
        self
    }

    /// The decoded pixels.
    #[inline]
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// The original encoded bytes, if known.
    #[inline]
    pub fn encoded_data(&self) -> Option<&[u8]> {
        self.encoded.as_deref()
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.bitmap.height
    }
}
