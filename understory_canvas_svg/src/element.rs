// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::borrow::Cow;
use std::collections::HashSet;

use kurbo::Rect;
use understory_canvas::{
    Affine, ClipStack, FillRule, FontSlant, Paint, Path, TextAlign,
};

use crate::fmt::{fmt_f32, fmt_scalar, path_data, svg_transform};
use crate::paint::{Resources, add_paint_attributes, resolve_resources};
use crate::{ResourceBucket, XmlWriter};

const FONT_WEIGHTS: [&str; 9] = [
    "100", "200", "300", "normal", "500", "600", "bold", "800", "900",
];

const FONT_STRETCHES: [&str; 9] = [
    "ultra-condensed",
    "extra-condensed",
    "condensed",
    "semi-condensed",
    "normal",
    "semi-expanded",
    "expanded",
    "extra-expanded",
    "ultra-expanded",
];

/// A value that can be written as an XML attribute.
pub trait AttributeValue {
    /// The attribute text, before escaping.
    fn to_attribute_value(&self) -> Cow<'_, str>;
}

impl AttributeValue for str {
    fn to_attribute_value(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl AttributeValue for String {
    fn to_attribute_value(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl AttributeValue for i32 {
    fn to_attribute_value(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl AttributeValue for u32 {
    fn to_attribute_value(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl AttributeValue for f32 {
    fn to_attribute_value(&self) -> Cow<'_, str> {
        Cow::Owned(fmt_f32(*self))
    }
}

impl AttributeValue for f64 {
    fn to_attribute_value(&self) -> Cow<'_, str> {
        Cow::Owned(fmt_scalar(*self))
    }
}

impl<T: AttributeValue + ?Sized> AttributeValue for &T {
    fn to_attribute_value(&self) -> Cow<'_, str> {
        (**self).to_attribute_value()
    }
}

/// The transform and clip a draw call is made under.
#[derive(Copy, Clone, Debug)]
pub struct MatrixClip<'a> {
    /// User space to device space.
    pub transform: Affine,
    /// Device-space clip.
    pub clip: &'a ClipStack,
}

impl<'a> MatrixClip<'a> {
    /// Bundle a transform and a clip.
    pub fn new(transform: Affine, clip: &'a ClipStack) -> Self {
        Self { transform, clip }
    }
}

/// An open XML element that is closed when dropped.
///
/// Created with [`AutoElement::with_paint`], the element is preceded by the
/// `<defs>` its paint and clip need, wrapped in a `<g clip-path=..>` when a
/// clip is active, and carries the paint's presentation attributes and the
/// current transform. Dropping it closes the element and then the clip group.
///
/// Nested elements are opened with [`AutoElement::child`], which borrows the
/// parent, so elements always close in reverse order of opening.
#[derive(Debug)]
pub struct AutoElement<'w, W: XmlWriter + ?Sized> {
    writer: &'w mut W,
    clip_group: bool,
}

impl<'w, W: XmlWriter + ?Sized> AutoElement<'w, W> {
    /// Open a bare element.
    pub fn new(name: &str, writer: &'w mut W) -> Self {
        writer.start_element(name);
        Self {
            writer,
            clip_group: false,
        }
    }

    /// Open an element drawn with `paint` under `mc`.
    pub fn with_paint(
        name: &str,
        writer: &'w mut W,
        resources: &mut ResourceBucket,
        mc: &MatrixClip<'_>,
        paint: &Paint,
    ) -> Self {
        let resolved = resolve_resources(writer, resources, mc, paint);

        let clip_group = !resolved.clip.is_empty();
        if clip_group {
            // The clip is in device space; the group keeps the element's own
            // transform from applying to it.
            writer.start_element("g");
            writer.add_attribute("clip-path", &resolved.clip);
        }

        writer.start_element(name);
        let mut element = Self { writer, clip_group };
        element.add_paint(paint, &resolved);
        if mc.transform != Affine::IDENTITY {
            element.add_attribute("transform", svg_transform(mc.transform));
        }
        element
    }

    /// Open a bare child element.
    pub fn child(&mut self, name: &str) -> AutoElement<'_, W> {
        AutoElement::new(name, &mut *self.writer)
    }

    /// Open a child element drawn with `paint` under `mc`.
    pub fn child_with_paint(
        &mut self,
        name: &str,
        resources: &mut ResourceBucket,
        mc: &MatrixClip<'_>,
        paint: &Paint,
    ) -> AutoElement<'_, W> {
        AutoElement::with_paint(name, &mut *self.writer, resources, mc, paint)
    }

    /// Add an attribute to this element.
    pub fn add_attribute(&mut self, name: &str, value: impl AttributeValue) {
        self.writer.add_attribute(name, &value.to_attribute_value());
    }

    /// Append already escaped text.
    pub fn add_text(&mut self, text: &str) {
        self.writer.add_text(text);
    }

    /// `x`/`y` (omitted when zero), then `width`/`height`.
    pub fn add_rect_attributes(&mut self, rect: Rect) {
        if rect.x0 != 0.0 {
            self.add_attribute("x", rect.x0);
        }
        if rect.y0 != 0.0 {
            self.add_attribute("y", rect.y0);
        }
        self.add_attribute("width", rect.width());
        self.add_attribute("height", rect.height());
    }

    /// `d`, plus `fill-rule="evenodd"` for even-odd paths.
    pub fn add_path_attributes(&mut self, path: &Path) {
        self.add_attribute("d", path_data(path.geometry()));
        if path.fill_rule() == FillRule::EvenOdd {
            self.add_attribute("fill-rule", "evenodd");
        }
    }

    /// Font attributes derived from the paint and its typeface.
    pub fn add_text_attributes(&mut self, paint: &Paint) {
        self.add_attribute("font-size", paint.text_size);

        match paint.text_align {
            TextAlign::Left => {}
            TextAlign::Center => self.add_attribute("text-anchor", "middle"),
            TextAlign::Right => self.add_attribute("text-anchor", "end"),
        }

        let typeface = paint.typeface();
        let style = typeface.font_style();
        match style.slant {
            FontSlant::Upright => {}
            FontSlant::Italic => self.add_attribute("font-style", "italic"),
            FontSlant::Oblique => self.add_attribute("font-style", "oblique"),
        }

        let weight_index = font_weight_index(style.weight);
        if weight_index != 3 {
            self.add_attribute("font-weight", FONT_WEIGHTS[weight_index]);
        }

        if let Some(stretch) = font_stretch_index(style.width)
            && stretch != 4
        {
            self.add_attribute("font-stretch", FONT_STRETCHES[stretch]);
        }

        let mut seen = HashSet::new();
        let mut family = String::new();
        for name in typeface.family_names() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if !family.is_empty() {
                family.push_str(", ");
            }
            family.push_str(&name);
        }
        if !family.is_empty() {
            self.add_attribute("font-family", family);
        }
    }

    fn add_paint(&mut self, paint: &Paint, resources: &Resources) {
        add_paint_attributes(self, paint, resources);
    }
}

impl<W: XmlWriter + ?Sized> Drop for AutoElement<'_, W> {
    fn drop(&mut self) {
        self.writer.end_element();
        if self.clip_group {
            self.writer.end_element();
        }
    }
}

fn font_weight_index(weight: i32) -> usize {
    let index = (weight.clamp(100, 900) - 50) / 100;
    // 0..=8 after clamping.
    usize::try_from(index).unwrap_or(3)
}

fn font_stretch_index(width: i32) -> Option<usize> {
    usize::try_from(width - 1)
        .ok()
        .filter(|&i| i < FONT_STRETCHES.len())
}
