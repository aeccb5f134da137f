// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::sync::Arc;

use kurbo::{Cap, Join};

use crate::{Color, ColorFilter, DefaultTypeface, Shader, Typeface};

/// Stroke geometry: width, caps, join, miter limit and dashes.
///
/// A width of zero is a hairline: one device pixel regardless of transform.
pub type StrokeStyle = kurbo::Stroke;

/// Which sides of a shape a paint draws.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaintStyle {
    /// Interior only.
    #[default]
    Fill,
    /// Outline only.
    Stroke,
    /// Interior, then outline.
    FillAndStroke,
}

impl PaintStyle {
    /// Returns `true` if the interior is drawn.
    #[inline]
    pub fn fills(self) -> bool {
        matches!(self, Self::Fill | Self::FillAndStroke)
    }

    /// Returns `true` if the outline is drawn.
    #[inline]
    pub fn strokes(self) -> bool {
        matches!(self, Self::Stroke | Self::FillAndStroke)
    }
}

/// Horizontal alignment of text relative to its origin.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    /// Text starts at the origin.
    #[default]
    Left,
    /// Text is centered on the origin.
    Center,
    /// Text ends at the origin.
    Right,
}

/// How the bytes of a text draw call are interpreted.
///
/// Multi-byte units use native byte order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-8 bytes.
    #[default]
    Utf8,
    /// UTF-16 code units.
    Utf16,
    /// UTF-32 code points.
    Utf32,
    /// 16-bit glyph ids, mapped back to characters through the typeface.
    GlyphId,
}

impl TextEncoding {
    /// Size of one code unit in bytes.
    pub fn unit_size(self) -> usize {
        match self {
            Self::Utf8 => 1,
            Self::Utf16 | Self::GlyphId => 2,
            Self::Utf32 => 4,
        }
    }
}

/// Everything that controls how a single draw call looks.
#[derive(Clone, Debug)]
pub struct Paint {
    /// Which sides are drawn.
    pub style: PaintStyle,
    /// Solid color; also supplies the opacity when a shader is set.
    pub color: Color,
    /// Stroke geometry for [`PaintStyle::Stroke`] and [`PaintStyle::FillAndStroke`].
    pub stroke: StrokeStyle,
    /// Optional paint source replacing the solid color.
    pub shader: Option<Shader>,
    /// Optional filter applied to the produced colors.
    pub color_filter: Option<ColorFilter>,
    /// Text size in user units.
    pub text_size: f64,
    /// Text alignment.
    pub text_align: TextAlign,
    /// Interpretation of text bytes.
    pub text_encoding: TextEncoding,
    /// Font used for text; [`DefaultTypeface`] when unset.
    pub typeface: Option<Arc<dyn Typeface>>,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            style: PaintStyle::Fill,
            color: Color::BLACK,
            stroke: StrokeStyle::new(0.0)
                .with_caps(Cap::Butt)
                .with_join(Join::Miter)
                .with_miter_limit(4.0),
            shader: None,
            color_filter: None,
            text_size: 12.0,
            text_align: TextAlign::Left,
            text_encoding: TextEncoding::Utf8,
            typeface: None,
        }
    }
}

impl Paint {
    /// A fill paint of the given color.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Returns this paint with a different style.
    pub fn with_style(mut self, style: PaintStyle) -> Self {
        self.style = style;
        self
    }

    /// Returns this paint with a different stroke width.
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke.width = width;
        self
    }

    /// Returns this paint with different stroke geometry.
    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = stroke;
        self
    }

    /// Returns this paint with a shader.
    pub fn with_shader(mut self, shader: impl Into<Shader>) -> Self {
        self.shader = Some(shader.into());
        self
    }

    /// Returns this paint with a color filter.
    pub fn with_color_filter(mut self, filter: ColorFilter) -> Self {
        self.color_filter = Some(filter);
        self
    }

    /// Returns this paint with a different text size.
    pub fn with_text_size(mut self, size: f64) -> Self {
        self.text_size = size;
        self
    }

    /// Returns this paint with a different text alignment.
    pub fn with_text_align(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }

    /// Returns this paint with a different text encoding.
    pub fn with_text_encoding(mut self, encoding: TextEncoding) -> Self {
        self.text_encoding = encoding;
        self
    }

    /// Returns this paint with a typeface.
    pub fn with_typeface(mut self, typeface: Arc<dyn Typeface>) -> Self {
        self.typeface = Some(typeface);
        self
    }

    /// The typeface used for text.
    pub fn typeface(&self) -> &dyn Typeface {
        match &self.typeface {
            Some(typeface) => typeface.as_ref(),
            None => &DefaultTypeface,
        }
    }
}
