// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_canvas --heading-base-level=0

//! Understory Canvas: the immutable input model consumed by canvas devices.
//!
//! A canvas device (such as the SVG device in `understory_canvas_svg`)
//! receives draw calls that reference a handful of plain data structures:
//!
//! - [`Paint`]: how a shape or text run is filled and stroked for one call
//!   (style, color, [`StrokeStyle`], optional [`Shader`] and [`ColorFilter`],
//!   text metrics, and an optional [`Typeface`]).
//! - [`Path`]: [`kurbo::BezPath`] geometry plus a [`FillRule`], with
//!   rectangle detection.
//! - [`ClipStack`]: the accumulated device-space clip, with save/restore.
//! - [`Bitmap`] and [`Image`]: RGBA8 pixels, optionally carrying already
//!   encoded bytes.
//! - [`Typeface`]: a read-only font metadata provider; [`FontTypeface`]
//!   implements it on top of `skrifa`.
//!
//! Devices only ever borrow these values for the duration of a single draw
//! call. Shared pixel storage uses `Arc<[u8]>`, so cloning a [`Paint`] that
//! carries an image shader is cheap.
//!
//! Transforms are [`kurbo::Affine`]. [`TransformKind`] classifies a transform
//! so devices can pick the most compact representation for it.

#![no_std]

extern crate alloc;

mod clip;
mod font;
mod image;
mod paint;
mod path;
mod shader;
mod typeface;

pub use clip::ClipStack;
pub use font::FontTypeface;
pub use image::{Bitmap, Image};
pub use paint::{Paint, PaintStyle, StrokeStyle, TextAlign, TextEncoding};
pub use path::Path;
pub use shader::{
    ColorFilter, GradientKind, GradientStop, ImageShader, LinearGradient, RadialGradient, Shader,
    SweepGradient,
};
pub use typeface::{DefaultTypeface, FontSlant, FontStyle, Typeface};

pub use peniko::{
    BlendMode, Color, Compose, Extend, Fill as FillRule, ImageAlphaType, Mix,
};

/// Affine transform type used by the canvas model.
pub type Affine = kurbo::Affine;

bitflags::bitflags! {
    /// Classification of an [`Affine`] transform.
    ///
    /// The empty set is the identity. Devices use this to choose between
    /// `translate(..)`, `scale(..)` and a full matrix when serializing.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct TransformKind: u8 {
        /// The transform has a nonzero translation.
        const TRANSLATE = 0b0001;
        /// The transform scales at least one axis (`scale_x != 1` or `scale_y != 1`).
        const SCALE = 0b0010;
        /// The transform has skew or rotation components.
        const AFFINE = 0b0100;
    }
}

impl TransformKind {
    /// Classify `transform`.
    pub fn of(transform: Affine) -> Self {
        let [a, b, c, d, e, f] = transform.as_coeffs();
        let mut kind = Self::empty();
        if e != 0.0 || f != 0.0 {
            kind |= Self::TRANSLATE;
        }
        if a != 1.0 || d != 1.0 {
            kind |= Self::SCALE;
        }
        if b != 0.0 || c != 0.0 {
            kind |= Self::AFFINE;
        }
        kind
    }

    /// Returns `true` if axis-aligned rectangles stay axis-aligned under this kind.
    #[inline]
    pub fn preserves_rects(self) -> bool {
        !self.contains(Self::AFFINE)
    }
}
