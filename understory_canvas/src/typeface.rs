// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;

/// Slant of a font face.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontSlant {
    /// No slant.
    #[default]
    Upright,
    /// A dedicated italic design.
    Italic,
    /// A slanted upright design.
    Oblique,
}

/// Weight, width and slant of a font face.
///
/// `weight` uses the CSS/OpenType scale (100..=900, 400 is normal) and
/// `width` the OpenType width classes (1..=9, 5 is normal).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontStyle {
    /// Weight, 400 is normal.
    pub weight: i32,
    /// Width class, 5 is normal.
    pub width: i32,
    /// Slant.
    pub slant: FontSlant,
}

impl FontStyle {
    /// Normal weight, normal width, upright.
    pub const NORMAL: Self = Self::new(400, 5, FontSlant::Upright);
    /// Bold, normal width, upright.
    pub const BOLD: Self = Self::new(700, 5, FontSlant::Upright);
    /// Normal weight, normal width, italic.
    pub const ITALIC: Self = Self::new(400, 5, FontSlant::Italic);

    /// Create a style.
    pub const fn new(weight: i32, width: i32, slant: FontSlant) -> Self {
        Self {
            weight,
            width,
            slant,
        }
    }
}

impl Default for FontStyle {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Read-only font metadata used when emitting text.
pub trait Typeface: Debug + Send + Sync {
    /// Style of the face.
    fn font_style(&self) -> FontStyle;

    /// Localized family names, in the order the font lists them.
    ///
    /// May contain duplicates.
    fn family_names(&self) -> Vec<String>;

    /// The character a glyph was mapped from, if any.
    fn glyph_to_char(&self, glyph: u16) -> Option<char>;
}

/// The typeface used when a paint has none: normal style, no names, no glyphs.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultTypeface;

impl Typeface for DefaultTypeface {
    fn font_style(&self) -> FontStyle {
        FontStyle::NORMAL
    }

    fn family_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn glyph_to_char(&self, _glyph: u16) -> Option<char> {
        None
    }
}
