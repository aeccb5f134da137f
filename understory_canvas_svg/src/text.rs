// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;
use understory_canvas::{Paint, TextEncoding};

use crate::fmt::fmt_position;

/// Converts encoded text and glyph positions into `<text>` content and
/// `x`/`y` attribute values.
///
/// Runs of spaces and tabs collapse to a single space, and leading and
/// trailing whitespace is dropped, mirroring SVG's default `xml:space`
/// handling so that positions stay aligned with the characters a viewer
/// actually lays out. Characters that cannot be decoded or mapped are
/// dropped together with their positions.
#[derive(Clone, Debug, Default)]
pub struct SvgTextBuilder {
    text: String,
    xs: Vec<f64>,
    ys: Vec<f64>,
    pos_x: String,
    pos_y: String,
}

impl SvgTextBuilder {
    /// Build text content from `text` encoded per `paint.text_encoding`.
    ///
    /// `scalars_per_position` is 0 (every character at `offset`), 1
    /// (`positions` holds one x per character, y is `offset.y`) or 2
    /// (`positions` holds x/y pairs). Positions are relative to `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `scalars_per_position` is greater than 2, if `positions` is
    /// shorter than the decoded characters require, or if the byte length is
    /// not a multiple of the encoding's unit size.
    pub fn new(
        text: &[u8],
        paint: &Paint,
        offset: Point,
        scalars_per_position: usize,
        positions: &[f64],
    ) -> Self {
        assert!(
            scalars_per_position <= 2,
            "scalars per position must be 0, 1 or 2, got {scalars_per_position}"
        );
        let chars = decode(text, paint);
        assert!(
            positions.len() >= chars.len() * scalars_per_position,
            "{} positions for {} characters at {scalars_per_position} scalars each",
            positions.len(),
            chars.len()
        );

        let mut builder = Self::default();
        let mut last_was_whitespace = true;
        let mut cursor = 0;
        for ch in chars {
            let mut discard = false;
            let mut is_whitespace = false;
            match ch {
                ' ' | '\t' => {
                    if last_was_whitespace {
                        discard = true;
                    } else {
                        builder.text.push(' ');
                    }
                    is_whitespace = true;
                }
                '\0' => {
                    discard = true;
                    is_whitespace = last_was_whitespace;
                }
                '&' => builder.text.push_str("&amp;"),
                '"' => builder.text.push_str("&quot;"),
                '\'' => builder.text.push_str("&apos;"),
                '<' => builder.text.push_str("&lt;"),
                '>' => builder.text.push_str("&gt;"),
                _ => builder.text.push(ch),
            }

            if !discard && scalars_per_position > 0 {
                builder.xs.push(offset.x + positions[cursor]);
                if scalars_per_position > 1 {
                    builder.ys.push(offset.y + positions[cursor + 1]);
                }
            }
            cursor += scalars_per_position;
            last_was_whitespace = is_whitespace;
        }

        if last_was_whitespace && builder.text.ends_with(' ') {
            builder.text.pop();
            builder.xs.pop();
            builder.ys.pop();
        }

        builder.pos_x = if scalars_per_position < 1 {
            fmt_position(offset.x)
        } else {
            join_positions(&builder.xs)
        };
        builder.pos_y = if scalars_per_position < 2 {
            fmt_position(offset.y)
        } else {
            join_positions(&builder.ys)
        };
        builder
    }

    /// Escaped character data.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The `x` attribute value.
    pub fn pos_x(&self) -> &str {
        &self.pos_x
    }

    /// The `y` attribute value.
    pub fn pos_y(&self) -> &str {
        &self.pos_y
    }
}

fn join_positions(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| fmt_position(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decode `text` into characters; undecodable input becomes `'\0'`.
fn decode(text: &[u8], paint: &Paint) -> Vec<char> {
    let encoding = paint.text_encoding;
    let unit = encoding.unit_size();
    assert!(
        text.len() % unit == 0,
        "{} bytes of {encoding:?} text is not a whole number of {unit}-byte units",
        text.len()
    );

    match encoding {
        TextEncoding::Utf8 => {
            let mut chars = Vec::with_capacity(text.len());
            for chunk in text.utf8_chunks() {
                chars.extend(chunk.valid().chars());
                if !chunk.invalid().is_empty() {
                    chars.push('\0');
                }
            }
            chars
        }
        TextEncoding::Utf16 => {
            let units = text
                .chunks_exact(2)
                .map(|b| u16::from_ne_bytes([b[0], b[1]]));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or('\0'))
                .collect()
        }
        TextEncoding::Utf32 => text
            .chunks_exact(4)
            .map(|b| char::from_u32(u32::from_ne_bytes([b[0], b[1], b[2], b[3]])).unwrap_or('\0'))
            .collect(),
        TextEncoding::GlyphId => {
            let typeface = paint.typeface();
            text.chunks_exact(2)
                .map(|b| {
                    typeface
                        .glyph_to_char(u16::from_ne_bytes([b[0], b[1]]))
                        .unwrap_or('\0')
                })
                .collect()
        }
    }
}
