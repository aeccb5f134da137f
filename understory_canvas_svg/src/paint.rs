// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint resolution: `<defs>` entries and presentation attributes.

use kurbo::{Cap, Join, Rect};
use understory_canvas::{
    Affine, BlendMode, Color, ColorFilter, Compose, Extend, FillRule, ImageShader,
    LinearGradient, Mix, Paint, Shader,
};

use crate::element::{AutoElement, MatrixClip};
use crate::fmt::{fmt_scalar, svg_color, svg_opacity, svg_transform};
use crate::image::image_data_uri;
use crate::{ResourceBucket, ResourceKind, XmlWriter};

/// References produced while resolving a paint for one draw call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Resources {
    /// `url(#..)` of a gradient or pattern, or the literal paint color.
    pub(crate) paint_server: String,
    /// `url(#..)` of the clip path, or empty.
    pub(crate) clip: String,
    /// `url(#..)` of the color filter, or empty.
    pub(crate) color_filter: String,
}

impl Resources {
    fn new(paint: &Paint) -> Self {
        Self {
            paint_server: svg_color(paint.color),
            clip: String::new(),
            color_filter: String::new(),
        }
    }
}

/// Emit the `<defs>` a draw call with `paint` under `mc` needs.
///
/// Writes nothing when there is no clip, no shader and no supported color
/// filter.
pub(crate) fn resolve_resources<W: XmlWriter + ?Sized>(
    writer: &mut W,
    bucket: &mut ResourceBucket,
    mc: &MatrixClip<'_>,
    paint: &Paint,
) -> Resources {
    let mut resources = Resources::new(paint);

    let has_clip = !mc.clip.is_wide_open();
    let filter_color = paint.color_filter.as_ref().and_then(supported_color_filter);
    if !has_clip && paint.shader.is_none() && filter_color.is_none() {
        return resources;
    }

    let mut defs = AutoElement::new("defs", writer);
    if has_clip {
        add_clip_resources(&mut defs, bucket, mc, &mut resources);
    }
    if let Some(shader) = &paint.shader {
        add_shader_resources(&mut defs, bucket, shader, &mut resources);
    }
    if let Some(color) = filter_color {
        add_color_filter_resources(&mut defs, bucket, color, &mut resources);
    }
    resources
}

/// The flood color of a filter that can be expressed in SVG.
///
/// Only a single color composed with the source as "source in" is supported.
fn supported_color_filter(filter: &ColorFilter) -> Option<Color> {
    let src_in = BlendMode::new(Mix::Normal, Compose::SrcIn);
    match filter.as_color_mode() {
        Some((color, mode)) if mode == src_in => Some(color),
        _ => {
            log::debug!("unsupported color filter {filter:?}, skipping");
            None
        }
    }
}

fn add_clip_resources<W: XmlWriter + ?Sized>(
    defs: &mut AutoElement<'_, W>,
    bucket: &mut ResourceBucket,
    mc: &MatrixClip<'_>,
    resources: &mut Resources,
) {
    debug_assert!(!mc.clip.is_wide_open(), "no clip to define");

    // Each layer after the first carries a `clip-path` referencing the
    // previous one, so the referenced clip is the intersection of them all.
    let mut previous: Option<String> = None;
    for clip_path in mc.clip.layers() {
        let clip_id = bucket.allocate(ResourceKind::Clip);
        let clip_rule = match clip_path.fill_rule() {
            FillRule::EvenOdd => "evenodd",
            FillRule::NonZero => "nonzero",
        };

        // Clip geometry is in device space; elements carry their own transform,
        // so userSpaceOnUse is device space here.
        let mut clip_element = defs.child("clipPath");
        clip_element.add_attribute("id", &clip_id);
        if let Some(previous) = &previous {
            clip_element.add_attribute("clip-path", &format!("url(#{previous})"));
        }

        let rect = if clip_path.is_empty() {
            Some(Rect::ZERO)
        } else {
            clip_path.as_rect()
        };
        match rect {
            Some(rect) => {
                let mut rect_element = clip_element.child("rect");
                rect_element.add_rect_attributes(rect);
                rect_element.add_attribute("clip-rule", clip_rule);
            }
            None => {
                let mut path_element = clip_element.child("path");
                path_element.add_path_attributes(&clip_path);
                path_element.add_attribute("clip-rule", clip_rule);
            }
        }
        previous = Some(clip_id);
    }

    if let Some(clip_id) = previous {
        resources.clip = format!("url(#{clip_id})");
    }
}

fn add_shader_resources<W: XmlWriter + ?Sized>(
    defs: &mut AutoElement<'_, W>,
    bucket: &mut ResourceBucket,
    shader: &Shader,
    resources: &mut Resources,
) {
    let local_transform = shader.local_transform();
    if let Some(gradient) = shader.as_linear_gradient() {
        let id = add_linear_gradient_def(defs, bucket, gradient, local_transform);
        resources.paint_server = format!("url(#{id})");
    } else if let Some(image) = shader.as_image() {
        add_image_shader_resources(defs, bucket, image, local_transform, resources);
    } else if let Some(kind) = shader.gradient_kind() {
        log::debug!("{kind:?} gradients are not supported, using the paint color");
    }
}

fn add_linear_gradient_def<W: XmlWriter + ?Sized>(
    defs: &mut AutoElement<'_, W>,
    bucket: &mut ResourceBucket,
    gradient: &LinearGradient,
    local_transform: Affine,
) -> String {
    let id = bucket.allocate(ResourceKind::Gradient);

    let mut element = defs.child("linearGradient");
    element.add_attribute("id", &id);
    element.add_attribute("gradientUnits", "userSpaceOnUse");
    element.add_attribute("x1", gradient.start.x);
    element.add_attribute("y1", gradient.start.y);
    element.add_attribute("x2", gradient.end.x);
    element.add_attribute("y2", gradient.end.y);
    if local_transform != Affine::IDENTITY {
        element.add_attribute("gradientTransform", svg_transform(local_transform));
    }

    for stop in &gradient.stops {
        let mut stop_element = element.child("stop");
        stop_element.add_attribute("offset", stop.offset);
        stop_element.add_attribute("stop-color", svg_color(stop.color));
        if let Some(opacity) = svg_opacity(stop.color) {
            stop_element.add_attribute("stop-opacity", opacity);
        }
    }

    id
}

fn add_image_shader_resources<W: XmlWriter + ?Sized>(
    defs: &mut AutoElement<'_, W>,
    bucket: &mut ResourceBucket,
    shader: &ImageShader,
    local_transform: Affine,
    resources: &mut Resources,
) {
    let data_uri = match image_data_uri(&shader.image) {
        Ok(uri) => uri,
        Err(err) => {
            log::warn!("skipping image pattern: {err}");
            return;
        }
    };

    let dimension = |extend: Extend, size: u32| match extend {
        Extend::Repeat => size.to_string(),
        _ => String::from("100%"),
    };
    let width = dimension(shader.x_extend, shader.image.width());
    let height = dimension(shader.y_extend, shader.image.height());

    let pattern_id = bucket.allocate(ResourceKind::Pattern);
    {
        let mut pattern = defs.child("pattern");
        pattern.add_attribute("id", &pattern_id);
        pattern.add_attribute("patternUnits", "userSpaceOnUse");
        pattern.add_attribute("patternContentUnits", "userSpaceOnUse");
        pattern.add_attribute("width", width);
        pattern.add_attribute("height", height);
        pattern.add_attribute("x", 0);
        pattern.add_attribute("y", 0);
        if local_transform != Affine::IDENTITY {
            pattern.add_attribute("patternTransform", svg_transform(local_transform));
        }

        let image_id = bucket.allocate(ResourceKind::Image);
        let mut image = pattern.child("image");
        image.add_attribute("id", image_id);
        image.add_attribute("x", 0);
        image.add_attribute("y", 0);
        image.add_attribute("width", shader.image.width());
        image.add_attribute("height", shader.image.height());
        image.add_attribute("xlink:href", data_uri);
    }

    resources.paint_server = format!("url(#{pattern_id})");
}

fn add_color_filter_resources<W: XmlWriter + ?Sized>(
    defs: &mut AutoElement<'_, W>,
    bucket: &mut ResourceBucket,
    color: Color,
    resources: &mut Resources,
) {
    let id = bucket.allocate(ResourceKind::ColorFilter);
    {
        let mut filter = defs.child("filter");
        filter.add_attribute("id", &id);
        filter.add_attribute("x", "0%");
        filter.add_attribute("y", "0%");
        filter.add_attribute("width", "100%");
        filter.add_attribute("height", "100%");

        {
            let mut flood = filter.child("feFlood");
            flood.add_attribute("flood-color", svg_color(color));
            flood.add_attribute("flood-opacity", svg_opacity(color).unwrap_or(1.0));
            flood.add_attribute("result", "flood");
        }

        let mut composite = filter.child("feComposite");
        composite.add_attribute("in", "flood");
        composite.add_attribute("operator", "in");
    }
    resources.color_filter = format!("url(#{id})");
}

/// Write `fill`, `stroke` and related presentation attributes.
pub(crate) fn add_paint_attributes<W: XmlWriter + ?Sized>(
    element: &mut AutoElement<'_, W>,
    paint: &Paint,
    resources: &Resources,
) {
    let opacity = svg_opacity(paint.color);

    if paint.style.fills() {
        element.add_attribute("fill", &resources.paint_server);
        if let Some(opacity) = opacity {
            element.add_attribute("fill-opacity", opacity);
        }
    } else {
        element.add_attribute("fill", "none");
    }

    if !resources.color_filter.is_empty() {
        element.add_attribute("filter", &resources.color_filter);
    }

    if !paint.style.strokes() {
        element.add_attribute("stroke", "none");
        return;
    }

    let stroke = &paint.stroke;
    element.add_attribute("stroke", &resources.paint_server);

    let mut width = stroke.width;
    if width == 0.0 {
        // Hairline.
        width = 1.0;
        element.add_attribute("vector-effect", "non-scaling-stroke");
    }
    element.add_attribute("stroke-width", width);

    // SVG has a single linecap; use the start cap.
    match stroke.start_cap {
        Cap::Butt => {}
        Cap::Round => element.add_attribute("stroke-linecap", "round"),
        Cap::Square => element.add_attribute("stroke-linecap", "square"),
    }
    match stroke.join {
        Join::Miter => element.add_attribute("stroke-miterlimit", stroke.miter_limit),
        Join::Round => element.add_attribute("stroke-linejoin", "round"),
        Join::Bevel => element.add_attribute("stroke-linejoin", "bevel"),
    }

    if !stroke.dash_pattern.is_empty() {
        let dashes = stroke
            .dash_pattern
            .iter()
            .map(|v| fmt_scalar(*v))
            .collect::<Vec<_>>()
            .join(",");
        element.add_attribute("stroke-dasharray", dashes);
        if stroke.dash_offset != 0.0 {
            element.add_attribute("stroke-dashoffset", stroke.dash_offset);
        }
    }

    if let Some(opacity) = opacity {
        element.add_attribute("stroke-opacity", opacity);
    }
}
