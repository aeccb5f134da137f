// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_canvas_svg --heading-base-level=0

//! SVG canvas device for Understory.
//!
//! [`SvgDevice`] turns a stream of canvas draw calls (rects, ovals, paths,
//! bitmaps, positioned text) into an SVG document, writing through an
//! [`XmlWriter`] as calls arrive. [`SvgStringWriter`] collects the document
//! into a `String`.
//!
//! Each draw call becomes one leaf element carrying its own `transform`.
//! Clips, gradients, image patterns and color filters are emitted as `<defs>`
//! right before the element that uses them and referenced by id; ids come
//! from a per-document [`ResourceBucket`] and are never reused. Elements are
//! closed by [`AutoElement`] guards when they go out of scope, and the root
//! `<svg>` is closed when the device is dropped.
//!
//! ```
//! use kurbo::Rect;
//! use understory_canvas::{Color, Paint};
//! use understory_canvas_svg::{SvgDevice, SvgStringWriter};
//!
//! let mut writer = SvgStringWriter::new();
//! {
//!     let mut device = SvgDevice::new(100, 80, &mut writer);
//!     device.draw_rect(
//!         Rect::new(10.0, 20.0, 30.0, 40.0),
//!         &Paint::new(Color::from_rgba8(255, 0, 0, 255)),
//!     );
//! }
//! let svg = writer.into_string();
//! assert!(svg.contains("<rect fill=\"#ff0000\" stroke=\"none\" x=\"10\" y=\"20\""));
//! assert!(svg.ends_with("</svg>"));
//! ```
//!
//! This is a vector export, not a rasterizer. Some inputs are approximated
//! or skipped (and logged at debug level through `log`):
//! - Only linear gradients and image shaders become paint servers; other
//!   shaders fall back to the paint color.
//! - Only single-color "source in" color filters are expressed.
//! - Discrete point drawing, vertex meshes and nested devices are ignored.
//! - Curved clip paths cut by a clip rectangle are flattened to polylines
//!   within a quarter of a device pixel.
//!
//! Unlike `understory_canvas`, this crate requires `std`: documents are
//! built as `String`s and embedded bitmaps are PNG-encoded with `png`.

mod element;
mod fmt;
mod image;
mod paint;
mod resources;
mod text;
mod xml;

use std::borrow::Cow;

use kurbo::{Point, Rect, RoundedRect, Vec2};
use understory_canvas::{Affine, Bitmap, ClipStack, Paint, Path, TextAlign};

pub use element::{AttributeValue, AutoElement, MatrixClip};
pub use image::{EncodeError, bitmap_data_uri, encode_png, image_data_uri, is_jpeg, is_png};
pub use resources::{ResourceBucket, ResourceKind};
pub use text::SvgTextBuilder;
pub use xml::{SvgStringWriter, XmlOptions, XmlWriter};

/// How [`SvgDevice::draw_points`] interprets its points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointMode {
    /// Each point on its own.
    Points,
    /// Consecutive pairs are line segments.
    Lines,
    /// All points form one closed polygon.
    Polygon,
}

/// The meaning of an annotation attached to a rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationKey {
    /// The value is a URL to link to.
    Url,
    /// The value names a destination defined at this location.
    DefineNamedDestination,
    /// The value names a destination to link to.
    LinkNamedDestination,
}

/// A canvas device that writes SVG.
///
/// The device owns the canvas state (transform and clip, with save/restore)
/// and the resource id counters; everything else is written straight
/// through to the borrowed [`XmlWriter`].
#[derive(Debug)]
pub struct SvgDevice<'w, W: XmlWriter + ?Sized> {
    writer: &'w mut W,
    resources: ResourceBucket,
    width: u32,
    height: u32,
    transform: Affine,
    clip: ClipStack,
    saved_transforms: Vec<Affine>,
}

impl<'w, W: XmlWriter + ?Sized> SvgDevice<'w, W> {
    /// Start a `width` x `height` document in `writer`.
    ///
    /// Writes the XML header and opens the root `<svg>` element, which stays
    /// open until the device is dropped.
    pub fn new(width: u32, height: u32, writer: &'w mut W) -> Self {
        writer.write_header();
        writer.start_element("svg");
        writer.add_attribute("xmlns", "http://www.w3.org/2000/svg");
        writer.add_attribute("xmlns:xlink", "http://www.w3.org/1999/xlink");
        writer.add_attribute("width", &width.to_attribute_value());
        writer.add_attribute("height", &height.to_attribute_value());
        Self {
            writer,
            resources: ResourceBucket::new(),
            width,
            height,
            transform: Affine::IDENTITY,
            clip: ClipStack::new(),
            saved_transforms: Vec::new(),
        }
    }

    /// Document width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Document height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Ids handed out so far.
    pub fn resources(&self) -> &ResourceBucket {
        &self.resources
    }

    /// The current user-to-device transform.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Replace the current transform.
    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    /// Apply `transform` before the current transform.
    pub fn concat(&mut self, transform: Affine) {
        self.transform *= transform;
    }

    /// The current clip.
    pub fn clip_stack(&self) -> &ClipStack {
        &self.clip
    }

    /// Save the transform and clip.
    pub fn save(&mut self) {
        self.saved_transforms.push(self.transform);
        self.clip.save();
    }

    /// Return to the transform and clip of the matching [`SvgDevice::save`].
    ///
    /// Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(transform) = self.saved_transforms.pop() {
            self.transform = transform;
            self.clip.restore();
        }
    }

    /// Intersect the clip with `rect` in user space.
    pub fn clip_rect(&mut self, rect: Rect) {
        self.clip.clip_rect(rect, self.transform);
    }

    /// Intersect the clip with `path` in user space.
    pub fn clip_path(&mut self, path: &Path) {
        self.clip.clip_path(path, self.transform);
    }

    fn device_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Fill the whole device with `paint`.
    pub fn draw_paint(&mut self, paint: &Paint) {
        let bounds = self.device_bounds();
        let mc = MatrixClip::new(self.transform, &self.clip);
        let mut rect =
            AutoElement::with_paint("rect", &mut *self.writer, &mut self.resources, &mc, paint);
        rect.add_rect_attributes(bounds);
    }

    /// Draw a rectangle.
    ///
    /// Repeating image shaders tile from the origin of the user space they
    /// are drawn in, so such rects are drawn inside a nested `<svg>` viewport
    /// placed at the rect.
    pub fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        let mc = MatrixClip::new(self.transform, &self.clip);
        let requires_viewport_reset = paint
            .shader
            .as_ref()
            .is_some_and(|shader| shader.tiles_with_repeat());

        if requires_viewport_reset {
            let mut svg =
                AutoElement::with_paint("svg", &mut *self.writer, &mut self.resources, &mc, paint);
            svg.add_rect_attributes(rect);

            let mut inner = svg.child_with_paint("rect", &mut self.resources, &mc, paint);
            inner.add_attribute("x", 0);
            inner.add_attribute("y", 0);
            inner.add_attribute("width", "100%");
            inner.add_attribute("height", "100%");
        } else {
            let mut element =
                AutoElement::with_paint("rect", &mut *self.writer, &mut self.resources, &mc, paint);
            element.add_rect_attributes(rect);
        }
    }

    /// Draw the ellipse inscribed in `oval`.
    pub fn draw_oval(&mut self, oval: Rect, paint: &Paint) {
        let mc = MatrixClip::new(self.transform, &self.clip);
        let center = oval.center();
        let mut ellipse =
            AutoElement::with_paint("ellipse", &mut *self.writer, &mut self.resources, &mc, paint);
        ellipse.add_attribute("cx", center.x);
        ellipse.add_attribute("cy", center.y);
        ellipse.add_attribute("rx", oval.width() / 2.0);
        ellipse.add_attribute("ry", oval.height() / 2.0);
    }

    /// Draw a rounded rectangle.
    pub fn draw_rrect(&mut self, rrect: RoundedRect, paint: &Paint) {
        self.draw_path(&Path::from_rounded_rect(rrect), paint);
    }

    /// Draw a path.
    pub fn draw_path(&mut self, path: &Path, paint: &Paint) {
        let mc = MatrixClip::new(self.transform, &self.clip);
        let mut element =
            AutoElement::with_paint("path", &mut *self.writer, &mut self.resources, &mc, paint);
        element.add_path_attributes(path);
    }

    /// Draw points, line segments or a polygon.
    pub fn draw_points(&mut self, mode: PointMode, points: &[Point], paint: &Paint) {
        match mode {
            PointMode::Points => {
                log::debug!("discrete point drawing is not supported, skipping");
            }
            PointMode::Lines => {
                for pair in points.chunks_exact(2) {
                    self.draw_path(&Path::from_line(pair[0], pair[1]), paint);
                }
            }
            PointMode::Polygon => {
                if points.len() > 1 {
                    self.draw_path(&Path::from_polygon(points, true), paint);
                }
            }
        }
    }

    /// Draw `bitmap` with its top-left corner at (`x`, `y`).
    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, x: f64, y: f64, paint: &Paint) {
        let transform = self.transform * Affine::translate(Vec2::new(x, y));
        let mc = MatrixClip::new(transform, &self.clip);
        draw_bitmap_common(&mut *self.writer, &mut self.resources, &mc, bitmap, paint);
    }

    /// Draw `bitmap` at an integer offset.
    pub fn draw_sprite(&mut self, bitmap: &Bitmap, x: i32, y: i32, paint: &Paint) {
        self.draw_bitmap(bitmap, f64::from(x), f64::from(y), paint);
    }

    /// Draw the `src` part of `bitmap` (all of it when `None`) scaled into `dst`.
    pub fn draw_bitmap_rect(
        &mut self,
        bitmap: &Bitmap,
        src: Option<Rect>,
        dst: Rect,
        paint: &Paint,
    ) {
        let full = Rect::new(0.0, 0.0, f64::from(bitmap.width()), f64::from(bitmap.height()));
        let src_rect = src.unwrap_or(full);

        // Only part of the bitmap is wanted; keep the rest out of `dst`.
        let clip = if src_rect != full {
            let mut clip = self.clip.clone();
            clip.clip_rect(dst, self.transform);
            Cow::Owned(clip)
        } else {
            Cow::Borrowed(&self.clip)
        };

        let transform = self.transform * rect_to_rect(src_rect, dst);
        let mc = MatrixClip::new(transform, &clip);
        draw_bitmap_common(&mut *self.writer, &mut self.resources, &mc, bitmap, paint);
    }

    /// Draw text with explicit glyph positions.
    ///
    /// See [`SvgTextBuilder::new`] for how `positions` and
    /// `scalars_per_position` are interpreted.
    pub fn draw_pos_text(
        &mut self,
        text: &[u8],
        positions: &[f64],
        scalars_per_position: usize,
        offset: Point,
        paint: &Paint,
    ) {
        let mc = MatrixClip::new(self.transform, &self.clip);
        let mut element =
            AutoElement::with_paint("text", &mut *self.writer, &mut self.resources, &mc, paint);
        element.add_text_attributes(paint);

        let builder = SvgTextBuilder::new(text, paint, offset, scalars_per_position, positions);
        element.add_attribute("x", builder.pos_x());
        element.add_attribute("y", builder.pos_y());
        element.add_text(builder.text());
    }

    /// Draw text starting at `origin`.
    pub fn draw_text(&mut self, text: &[u8], origin: Point, paint: &Paint) {
        self.draw_pos_text(text, &[], 0, origin, paint);
    }

    /// Draw text along `path`, optionally transformed by `transform`.
    pub fn draw_text_on_path(
        &mut self,
        text: &[u8],
        path: &Path,
        transform: Option<Affine>,
        paint: &Paint,
    ) {
        let path_id = self.resources.allocate(ResourceKind::Path);
        {
            let mut defs = AutoElement::new("defs", &mut *self.writer);
            let mut path_element = defs.child("path");
            path_element.add_attribute("id", &path_id);
            path_element.add_path_attributes(path);
        }

        let mut text_element = AutoElement::new("text", &mut *self.writer);
        text_element.add_text_attributes(paint);
        if let Some(transform) = transform
            && transform != Affine::IDENTITY
        {
            text_element.add_attribute("transform", fmt::svg_transform(transform));
        }

        let mut text_path = text_element.child("textPath");
        text_path.add_attribute("xlink:href", format!("#{path_id}"));
        match paint.text_align {
            TextAlign::Left => {}
            TextAlign::Center => text_path.add_attribute("startOffset", "50%"),
            TextAlign::Right => text_path.add_attribute("startOffset", "100%"),
        }

        let builder = SvgTextBuilder::new(text, paint, Point::ZERO, 0, &[]);
        text_path.add_text(builder.text());
    }

    /// Attach a link to the device-space area covered by `rect`.
    ///
    /// Emits an invisible rect inside an `<a>` element. Areas clipped away
    /// entirely, missing values and named destination definitions produce
    /// nothing.
    pub fn draw_annotation(&mut self, rect: Rect, key: AnnotationKey, value: Option<&str>) {
        let Some(value) = value else {
            return;
        };
        if key == AnnotationKey::DefineNamedDestination {
            log::debug!("named destination definitions are not supported, skipping");
            return;
        }

        let mut clip = self.clip.clone();
        clip.clip_rect(rect, self.transform);
        let bounds = clip.bounds(self.device_bounds());
        if bounds.is_zero_area() {
            return;
        }

        let mut anchor = AutoElement::new("a", &mut *self.writer);
        anchor.add_attribute("xlink:href", value);
        let mut area = anchor.child("rect");
        area.add_attribute("fill-opacity", "0.0");
        area.add_rect_attributes(bounds);
    }

    /// Vertex meshes cannot be expressed; this draws nothing.
    pub fn draw_vertices(&mut self, vertices: &[Point], _paint: &Paint) {
        log::debug!(
            "vertex meshes are not supported, skipping {} vertices",
            vertices.len()
        );
    }

    /// Compositing another device's output is not supported; this draws nothing.
    pub fn draw_device<V: XmlWriter + ?Sized>(
        &mut self,
        _device: &SvgDevice<'_, V>,
        x: i32,
        y: i32,
        _paint: &Paint,
    ) {
        log::debug!("nested device drawing at ({x}, {y}) is not supported, skipping");
    }
}

impl<W: XmlWriter + ?Sized> Drop for SvgDevice<'_, W> {
    fn drop(&mut self) {
        // Root <svg>.
        self.writer.end_element();
    }
}

/// Render a document into a string.
///
/// `draw` receives a fresh device; the document is complete when it returns.
pub fn render_svg(
    width: u32,
    height: u32,
    options: XmlOptions,
    draw: impl FnOnce(&mut SvgDevice<'_, SvgStringWriter>),
) -> String {
    let mut writer = SvgStringWriter::with_options(options);
    {
        let mut device = SvgDevice::new(width, height, &mut writer);
        draw(&mut device);
    }
    writer.into_string()
}

fn draw_bitmap_common<W: XmlWriter + ?Sized>(
    writer: &mut W,
    resources: &mut ResourceBucket,
    mc: &MatrixClip<'_>,
    bitmap: &Bitmap,
    paint: &Paint,
) {
    let data_uri = match bitmap_data_uri(bitmap) {
        Ok(uri) => uri,
        Err(err) => {
            log::warn!("skipping bitmap: {err}");
            return;
        }
    };

    let image_id = resources.allocate(ResourceKind::Image);
    {
        let mut defs = AutoElement::new("defs", &mut *writer);
        let mut image = defs.child("image");
        image.add_attribute("id", &image_id);
        image.add_attribute("width", bitmap.width());
        image.add_attribute("height", bitmap.height());
        image.add_attribute("xlink:href", data_uri);
    }

    let mut image_use = AutoElement::with_paint("use", writer, resources, mc, paint);
    image_use.add_attribute("xlink:href", format!("#{image_id}"));
}

/// Scale and translate `src` onto `dst`; identity for an empty `src`.
fn rect_to_rect(src: Rect, dst: Rect) -> Affine {
    if src.is_zero_area() {
        return Affine::IDENTITY;
    }
    let scale_x = dst.width() / src.width();
    let scale_y = dst.height() / src.height();
    Affine::translate(dst.origin().to_vec2())
        * Affine::scale_non_uniform(scale_x, scale_y)
        * Affine::translate(-src.origin().to_vec2())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use understory_canvas::{
        BlendMode, Color, ColorFilter, Compose, Extend, FillRule, FontSlant, FontStyle,
        GradientStop, Image, ImageShader, LinearGradient, Mix, PaintStyle, RadialGradient,
        Typeface,
    };

    fn render(draw: impl FnOnce(&mut SvgDevice<'_, SvgStringWriter>)) -> String {
        render_svg(
            100,
            80,
            XmlOptions {
                declaration: false,
                indent: None,
            },
            draw,
        )
    }

    fn red() -> Paint {
        Paint::new(Color::from_rgba8(255, 0, 0, 255))
    }

    fn tile() -> Image {
        Image::from(Bitmap::new(4, 2, vec![0_u8; 4 * 2 * 4]))
    }

    #[test]
    fn root_element() {
        let mut writer = SvgStringWriter::new();
        {
            let _device = SvgDevice::new(100, 80, &mut writer);
        }
        assert_eq!(
            writer.as_str(),
            "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" \
             xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"100\" height=\"80\"/>"
        );
        assert_eq!(writer.depth(), 0);
    }

    #[test]
    fn rect_attributes() {
        let svg = render(|d| {
            d.draw_rect(Rect::new(0.0, 0.0, 10.0, 20.0), &red());
            d.draw_rect(Rect::new(5.0, 0.0, 15.0, 20.0), &red());
        });
        assert!(svg.contains(
            "<rect fill=\"#ff0000\" stroke=\"none\" width=\"10\" height=\"20\"/>"
        ));
        assert!(svg.contains(
            "<rect fill=\"#ff0000\" stroke=\"none\" x=\"5\" width=\"10\" height=\"20\"/>"
        ));
    }

    #[test]
    fn transform_forms() {
        let svg = render(|d| {
            d.set_transform(Affine::translate(Vec2::new(5.0, 6.0)));
            d.draw_oval(Rect::new(0.0, 0.0, 10.0, 4.0), &red());
            d.set_transform(Affine::scale(2.0));
            d.draw_oval(Rect::new(0.0, 0.0, 10.0, 4.0), &red());
            d.set_transform(Affine::rotate(core::f64::consts::FRAC_PI_2));
            d.draw_oval(Rect::new(0.0, 0.0, 10.0, 4.0), &red());
        });
        assert!(svg.contains(
            "<ellipse fill=\"#ff0000\" stroke=\"none\" transform=\"translate(5 6)\" \
             cx=\"5\" cy=\"2\" rx=\"5\" ry=\"2\"/>"
        ));
        assert!(svg.contains("transform=\"scale(2 2)\""));
        assert!(svg.contains("transform=\"matrix(6.12323e-17 1 -1 6.12323e-17 0 0)\""));
    }

    #[test]
    fn tiny_scale_survives() {
        let svg = render(|d| {
            d.set_transform(Affine::scale(1.0 / 4096.0));
            d.draw_rect(Rect::new(0.0, 0.0, 2048.0, 2048.0), &red());
        });
        assert!(svg.contains("transform=\"scale(0.000244141 0.000244141)\""));
    }

    #[test]
    fn tiny_text_positions_survive() {
        let svg = render(|d| {
            d.draw_pos_text(b"ab", &[0.0001, 0.0, 0.0004, 0.0], 2, Point::ZERO, &red());
        });
        assert!(svg.contains("x=\"0.0001, 0.0004\" y=\"0, 0\""));
    }

    #[test]
    fn opacity_only_when_translucent() {
        let svg = render(|d| {
            d.draw_paint(&Paint::new(Color::from_rgba8(0, 0, 255, 128)));
        });
        assert!(svg.contains("fill=\"#0000ff\" fill-opacity=\"0.501961\""));

        let svg = render(|d| d.draw_paint(&red()));
        assert!(!svg.contains("opacity"));
    }

    #[test]
    fn hairline_stroke() {
        let paint = red().with_style(PaintStyle::Stroke);
        let svg = render(|d| d.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &paint));
        assert!(svg.contains(
            "fill=\"none\" stroke=\"#ff0000\" vector-effect=\"non-scaling-stroke\" \
             stroke-width=\"1\" stroke-miterlimit=\"4\""
        ));
    }

    #[test]
    fn stroke_details() {
        let mut paint = red()
            .with_style(PaintStyle::FillAndStroke)
            .with_stroke_width(2.5);
        paint.stroke = paint
            .stroke
            .with_caps(kurbo::Cap::Round)
            .with_join(kurbo::Join::Bevel)
            .with_dashes(1.0, [4.0, 2.0]);
        paint.color = Color::from_rgba8(255, 0, 0, 64);
        let svg = render(|d| d.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &paint));
        assert!(svg.contains(
            "fill=\"#ff0000\" fill-opacity=\"0.25098\" stroke=\"#ff0000\" stroke-width=\"2.5\" \
             stroke-linecap=\"round\" stroke-linejoin=\"bevel\" stroke-dasharray=\"4,2\" \
             stroke-dashoffset=\"1\" stroke-opacity=\"0.25098\""
        ));
        assert!(!svg.contains("miterlimit"));
    }

    #[test]
    fn even_odd_path() {
        let path = Path::from_polygon(
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(5.0, 5.0),
            ],
            true,
        )
        .with_fill_rule(FillRule::EvenOdd);
        let svg = render(|d| d.draw_path(&path, &red()));
        assert!(svg.contains("d=\"M0 0 L10 0 L5 5 Z\" fill-rule=\"evenodd\""));
    }

    #[test]
    fn rect_clip_becomes_clip_rect() {
        let svg = render(|d| {
            d.clip_rect(Rect::new(1.0, 2.0, 11.0, 12.0));
            d.draw_rect(Rect::new(0.0, 0.0, 50.0, 50.0), &red());
        });
        assert!(svg.contains(
            "<defs><clipPath id=\"clip_0\"><rect x=\"1\" y=\"2\" width=\"10\" height=\"10\" \
             clip-rule=\"nonzero\"/></clipPath></defs>\
             <g clip-path=\"url(#clip_0)\"><rect fill=\"#ff0000\" stroke=\"none\" width=\"50\" \
             height=\"50\"/></g>"
        ));
    }

    #[test]
    fn path_clip_keeps_rule() {
        let triangle = Path::from_polygon(
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(5.0, 5.0),
            ],
            true,
        )
        .with_fill_rule(FillRule::EvenOdd);
        let svg = render(|d| {
            d.clip_path(&triangle);
            d.draw_rect(Rect::new(0.0, 0.0, 50.0, 50.0), &red());
        });
        assert!(svg.contains(
            "<clipPath id=\"clip_0\"><path d=\"M0 0 L10 0 L5 5 Z\" fill-rule=\"evenodd\" \
             clip-rule=\"evenodd\"/></clipPath>"
        ));
    }

    #[test]
    fn save_restore_drops_clip() {
        let svg = render(|d| {
            d.save();
            d.clip_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
            d.concat(Affine::scale(3.0));
            d.restore();
            d.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &red());
        });
        assert!(!svg.contains("clip"));
        assert!(!svg.contains("transform"));
    }

    #[test]
    fn linear_gradient() {
        let gradient = LinearGradient {
            start: Point::new(0.0, 0.0),
            end: Point::new(100.0, 0.0),
            stops: vec![
                GradientStop::new(0.0, Color::from_rgba8(255, 0, 0, 255)),
                GradientStop::new(1.0, Color::from_rgba8(0, 0, 255, 128)),
            ],
            local_transform: Affine::scale(2.0),
        };
        let paint = Paint::default().with_shader(gradient);
        let svg = render(|d| d.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &paint));
        assert!(svg.contains(
            "<defs><linearGradient id=\"gradient_0\" gradientUnits=\"userSpaceOnUse\" \
             x1=\"0\" y1=\"0\" x2=\"100\" y2=\"0\" gradientTransform=\"scale(2 2)\">\
             <stop offset=\"0\" stop-color=\"#ff0000\"/>\
             <stop offset=\"1\" stop-color=\"#0000ff\" stop-opacity=\"0.501961\"/>\
             </linearGradient></defs>"
        ));
        assert!(svg.contains("fill=\"url(#gradient_0)\""));
    }

    #[test]
    fn radial_gradient_falls_back_to_color() {
        let gradient = RadialGradient {
            center: Point::new(5.0, 5.0),
            radius: 5.0,
            stops: vec![],
            local_transform: Affine::IDENTITY,
        };
        let paint = red().with_shader(understory_canvas::Shader::RadialGradient(gradient));
        let svg = render(|d| d.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &paint));
        assert!(svg.contains("<defs/><rect fill=\"#ff0000\""));
    }

    #[test]
    fn repeating_pattern_resets_viewport() {
        let shader = ImageShader {
            x_extend: Extend::Repeat,
            ..ImageShader::new(tile(), Extend::Pad)
        };
        let paint = Paint::default().with_shader(shader);
        let svg = render(|d| d.draw_rect(Rect::new(10.0, 10.0, 30.0, 20.0), &paint));
        assert!(svg.contains(
            "<pattern id=\"pattern_0\" patternUnits=\"userSpaceOnUse\" \
             patternContentUnits=\"userSpaceOnUse\" width=\"4\" height=\"100%\" x=\"0\" y=\"0\">\
             <image id=\"img_0\" x=\"0\" y=\"0\" width=\"4\" height=\"2\" \
             xlink:href=\"data:image/png;base64,"
        ));
        assert!(svg.contains(
            "<svg fill=\"url(#pattern_0)\" stroke=\"none\" x=\"10\" y=\"10\" width=\"20\" height=\"10\">"
        ));
        assert!(svg.contains(
            "<rect fill=\"url(#pattern_1)\" stroke=\"none\" x=\"0\" y=\"0\" width=\"100%\" height=\"100%\"/>"
        ));
    }

    #[test]
    fn pattern_follows_local_transform() {
        let shader = ImageShader {
            local_transform: Affine::translate((3.0, 4.0)),
            ..ImageShader::new(tile(), Extend::Pad)
        };
        let paint = Paint::default().with_shader(shader);
        let svg = render(|d| d.draw_oval(Rect::new(0.0, 0.0, 8.0, 8.0), &paint));
        assert!(svg.contains(
            "width=\"100%\" height=\"100%\" x=\"0\" y=\"0\" patternTransform=\"translate(3 4)\">"
        ));

        let plain = Paint::default().with_shader(ImageShader::new(tile(), Extend::Pad));
        let svg = render(|d| d.draw_oval(Rect::new(0.0, 0.0, 8.0, 8.0), &plain));
        assert!(svg.contains("<pattern"));
        assert!(!svg.contains("patternTransform"));
    }

    #[test]
    fn broken_pattern_keeps_color() {
        let image = Image::from(Bitmap::new(4, 4, vec![0_u8; 3]));
        let paint = red().with_shader(ImageShader::new(image, Extend::Pad));
        let svg = render(|d| d.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &paint));
        assert!(!svg.contains("pattern"));
        assert!(svg.contains("fill=\"#ff0000\""));
    }

    #[test]
    fn src_in_color_filter() {
        let paint = red().with_color_filter(ColorFilter::Blend {
            color: Color::from_rgba8(0, 255, 0, 255),
            mode: BlendMode::new(Mix::Normal, Compose::SrcIn),
        });
        let svg = render(|d| d.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &paint));
        assert!(svg.contains(
            "<defs><filter id=\"cfilter_0\" x=\"0%\" y=\"0%\" width=\"100%\" height=\"100%\">\
             <feFlood flood-color=\"#00ff00\" flood-opacity=\"1\" result=\"flood\"/>\
             <feComposite in=\"flood\" operator=\"in\"/></filter></defs>"
        ));
        assert!(svg.contains("fill=\"#ff0000\" filter=\"url(#cfilter_0)\" stroke=\"none\""));
    }

    #[test]
    fn other_color_filters_are_skipped() {
        let paint = red().with_color_filter(ColorFilter::Blend {
            color: Color::from_rgba8(0, 255, 0, 255),
            mode: BlendMode::new(Mix::Multiply, Compose::SrcOver),
        });
        let svg = render(|d| d.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &paint));
        assert!(!svg.contains("<defs"));
        assert!(!svg.contains("filter"));
    }

    #[test]
    fn points_modes() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
        ];
        let svg = render(|d| d.draw_points(PointMode::Lines, &points, &red()));
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains("d=\"M0 0 L1 1\""));

        let svg = render(|d| d.draw_points(PointMode::Polygon, &points, &red()));
        assert!(svg.contains("d=\"M0 0 L1 1 L2 2 Z\""));

        let svg = render(|d| d.draw_points(PointMode::Points, &points, &red()));
        assert!(!svg.contains("<path"));

        let svg = render(|d| d.draw_points(PointMode::Polygon, &points[..1], &red()));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn bitmap_is_defined_then_used() {
        let bitmap = Bitmap::new(2, 2, vec![255_u8; 16]);
        let svg = render(|d| d.draw_bitmap(&bitmap, 3.0, 4.0, &red()));
        assert!(svg.contains("<defs><image id=\"img_0\" width=\"2\" height=\"2\" xlink:href=\"data:image/png;base64,"));
        assert!(svg.contains(
            "<use fill=\"#ff0000\" stroke=\"none\" transform=\"translate(3 4)\" xlink:href=\"#img_0\"/>"
        ));
    }

    #[test]
    fn broken_bitmap_is_skipped() {
        let bitmap = Bitmap::new(2, 2, vec![255_u8; 3]);
        let svg = render(|d| d.draw_sprite(&bitmap, 1, 1, &red()));
        assert!(!svg.contains("<image"));
        assert!(!svg.contains("<use"));
    }

    #[test]
    fn bitmap_rect_with_source() {
        let bitmap = Bitmap::new(4, 4, vec![255_u8; 64]);
        let svg = render(|d| {
            d.draw_bitmap_rect(
                &bitmap,
                Some(Rect::new(0.0, 0.0, 2.0, 2.0)),
                Rect::new(10.0, 10.0, 30.0, 30.0),
                &red(),
            );
        });
        assert!(svg.contains(
            "<clipPath id=\"clip_0\"><rect x=\"10\" y=\"10\" width=\"20\" height=\"20\" \
             clip-rule=\"nonzero\"/></clipPath>"
        ));
        assert!(svg.contains("transform=\"matrix(10 0 0 10 10 10)\""));

        // The full source needs no clip.
        let svg = render(|d| {
            d.draw_bitmap_rect(&bitmap, None, Rect::new(0.0, 0.0, 8.0, 8.0), &red());
        });
        assert!(!svg.contains("clipPath"));
        assert!(svg.contains("transform=\"scale(2 2)\""));
    }

    #[derive(Debug)]
    struct Serif;

    impl Typeface for Serif {
        fn font_style(&self) -> FontStyle {
            FontStyle::new(700, 3, FontSlant::Italic)
        }

        fn family_names(&self) -> Vec<String> {
            vec!["Noto Serif".into(), "Serif".into(), "Noto Serif".into()]
        }

        fn glyph_to_char(&self, _glyph: u16) -> Option<char> {
            None
        }
    }

    #[test]
    fn text_attributes() {
        let paint = Paint::default()
            .with_text_size(16.0)
            .with_text_align(TextAlign::Center)
            .with_typeface(Arc::new(Serif));
        let svg = render(|d| d.draw_text(b" Hi  there ", Point::new(2.0, 20.0), &paint));
        assert!(svg.contains(
            "<text fill=\"#000000\" stroke=\"none\" font-size=\"16\" text-anchor=\"middle\" \
             font-style=\"italic\" font-weight=\"bold\" font-stretch=\"condensed\" \
             font-family=\"Noto Serif, Serif\" x=\"2\" y=\"20\">Hi there</text>"
        ));
    }

    #[test]
    fn pos_text() {
        let svg = render(|d| {
            d.draw_pos_text(
                b"a<b",
                &[0.0, 0.0, 5.0, 1.0, 10.0, 2.0],
                2,
                Point::new(1.0, 1.0),
                &Paint::default(),
            );
        });
        assert!(svg.contains(
            "font-size=\"12\" x=\"1, 6, 11\" y=\"1, 2, 3\">a&lt;b</text>"
        ));
    }

    #[test]
    fn text_on_path() {
        let path = Path::from_line(Point::new(0.0, 10.0), Point::new(90.0, 10.0));
        let paint = Paint::default().with_text_align(TextAlign::Right);
        let svg = render(|d| {
            d.draw_text_on_path(b"along", &path, Some(Affine::scale(0.5)), &paint);
        });
        assert!(svg.contains(
            "<defs><path id=\"path_0\" d=\"M0 10 L90 10\"/></defs>\
             <text font-size=\"12\" transform=\"scale(0.5 0.5)\">\
             <textPath xlink:href=\"#path_0\" startOffset=\"100%\">along</textPath></text>"
        ));
    }

    #[test]
    fn annotations() {
        let svg = render(|d| {
            d.set_transform(Affine::translate(Vec2::new(10.0, 0.0)));
            d.draw_annotation(
                Rect::new(0.0, 0.0, 20.0, 10.0),
                AnnotationKey::Url,
                Some("https://example.com/?a&b"),
            );
            d.draw_annotation(
                Rect::new(0.0, 0.0, 20.0, 10.0),
                AnnotationKey::DefineNamedDestination,
                Some("here"),
            );
            d.draw_annotation(Rect::new(0.0, 0.0, 20.0, 10.0), AnnotationKey::Url, None);
            // Outside the device.
            d.draw_annotation(
                Rect::new(500.0, 500.0, 520.0, 510.0),
                AnnotationKey::LinkNamedDestination,
                Some("#there"),
            );
        });
        assert_eq!(svg.matches("<a ").count(), 1);
        assert!(svg.contains(
            "<a xlink:href=\"https://example.com/?a&amp;b\">\
             <rect fill-opacity=\"0.0\" x=\"10\" width=\"20\" height=\"10\"/></a>"
        ));
    }

    #[test]
    fn unsupported_draws_are_noops() {
        let svg = render(|d| {
            d.draw_vertices(&[Point::ZERO, Point::new(1.0, 0.0), Point::new(0.0, 1.0)], &red());
            let mut other_writer = SvgStringWriter::new();
            let other = SvgDevice::new(10, 10, &mut other_writer);
            d.draw_device(&other, 0, 0, &red());
        });
        assert!(svg.ends_with("height=\"80\"/>"), "{svg}");
    }

    #[test]
    fn ids_are_monotonic_across_draws() {
        let svg = render(|d| {
            d.clip_rect(Rect::new(0.0, 0.0, 50.0, 50.0));
            d.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &red());
            d.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &red());
            assert_eq!(d.resources().allocated(ResourceKind::Clip), 2);
        });
        assert!(svg.contains("id=\"clip_0\""));
        assert!(svg.contains("id=\"clip_1\""));
    }

    #[test]
    fn rect_to_rect_maps_corners() {
        let m = rect_to_rect(
            Rect::new(1.0, 1.0, 3.0, 5.0),
            Rect::new(10.0, 20.0, 14.0, 28.0),
        );
        assert_eq!(m * Point::new(1.0, 1.0), Point::new(10.0, 20.0));
        assert_eq!(m * Point::new(3.0, 5.0), Point::new(14.0, 28.0));
        assert_eq!(rect_to_rect(Rect::ZERO, Rect::new(0.0, 0.0, 1.0, 1.0)), Affine::IDENTITY);
    }
}
