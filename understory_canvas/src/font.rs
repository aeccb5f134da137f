// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use skrifa::attribute::Style;
use skrifa::raw::ReadError;
use skrifa::string::StringId;
use skrifa::{FontRef, MetadataProvider};

use crate::{FontSlant, FontStyle, Typeface};

/// Stretch ratios of the OpenType width classes 1..=9.
const WIDTH_CLASS_RATIOS: [f32; 9] = [0.5, 0.625, 0.75, 0.875, 1.0, 1.125, 1.25, 1.5, 2.0];

/// A [`Typeface`] backed by font data parsed with `skrifa`.
///
/// All metadata is read once, at construction, so the font bytes do not
/// need to outlive the typeface.
#[derive(Clone, Debug)]
pub struct FontTypeface {
    style: FontStyle,
    family_names: Vec<String>,
    glyph_chars: BTreeMap<u16, char>,
}

impl FontTypeface {
    /// Parse the face at `index` of a font file or collection.
    pub fn new(data: &[u8], index: u32) -> Result<Self, ReadError> {
        let font = FontRef::from_index(data, index)?;

        let attributes = font.attributes();
        let slant = match attributes.style {
            Style::Normal => FontSlant::Upright,
            Style::Italic => FontSlant::Italic,
            _ => FontSlant::Oblique,
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "OpenType weights are integral"
        )]
        let weight = attributes.weight.value() as i32;
        let style = FontStyle::new(
            weight,
            width_class_for_ratio(attributes.stretch.ratio()),
            slant,
        );

        let family_names = font
            .localized_strings(StringId::FAMILY_NAME)
            .map(|name| name.chars().collect::<String>())
            .filter(|name| !name.is_empty())
            .collect();

        let mut glyph_chars = BTreeMap::new();
        for (codepoint, glyph) in font.charmap().mappings() {
            let (Ok(glyph), Some(ch)) = (u16::try_from(glyph.to_u32()), char::from_u32(codepoint))
            else {
                continue;
            };
            // Several characters may share a glyph; the first mapping wins.
            glyph_chars.entry(glyph).or_insert(ch);
        }

        Ok(Self {
            style,
            family_names,
            glyph_chars,
        })
    }
}

impl Typeface for FontTypeface {
    fn font_style(&self) -> FontStyle {
        self.style
    }

    fn family_names(&self) -> Vec<String> {
        self.family_names.clone()
    }

    fn glyph_to_char(&self, glyph: u16) -> Option<char> {
        self.glyph_chars.get(&glyph).copied()
    }
}

/// The width class (1..=9) whose stretch ratio is closest to `ratio`.
fn width_class_for_ratio(ratio: f32) -> i32 {
    let mut best = 5;
    let mut best_distance = f32::INFINITY;
    for (class, candidate) in (1..).zip(WIDTH_CLASS_RATIOS) {
        let distance = if ratio > candidate {
            ratio - candidate
        } else {
            candidate - ratio
        };
        if distance < best_distance {
            best = class;
            best_distance = distance;
        }
    }
    best
}
