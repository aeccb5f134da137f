// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec;
use alloc::vec::Vec;

use kurbo::{BezPath, PathEl, Point, Rect};

use crate::{Affine, Path, TransformKind};

#[derive(Clone, Debug, PartialEq)]
enum ClipElement {
    Rect(Rect),
    Path(Path),
}

impl ClipElement {
    fn bounds(&self) -> Rect {
        match self {
            Self::Rect(rect) => *rect,
            Self::Path(path) => path.bounds(),
        }
    }
}

/// The accumulated device-space clip.
///
/// Every element intersects the region described by the elements before it.
/// Elements are stored in device space: [`ClipStack::clip_rect`] and
/// [`ClipStack::clip_path`] map their input through the current transform
/// when they are pushed.
///
/// An empty stack is *wide open*: nothing is clipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipStack {
    elements: Vec<ClipElement>,
    save_points: Vec<usize>,
}

impl ClipStack {
    /// Create a wide-open clip stack.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no clip is active.
    #[inline]
    pub fn is_wide_open(&self) -> bool {
        self.elements.is_empty()
    }

    /// Remember the current clip so that [`ClipStack::restore`] can return to it.
    pub fn save(&mut self) {
        self.save_points.push(self.elements.len());
    }

    /// Drop every element pushed since the matching [`ClipStack::save`].
    ///
    /// Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(len) = self.save_points.pop() {
            self.elements.truncate(len);
        }
    }

    /// Intersect the clip with `rect` mapped through `transform`.
    pub fn clip_rect(&mut self, rect: Rect, transform: Affine) {
        let element = if TransformKind::of(transform).preserves_rects() {
            ClipElement::Rect(transform.transform_rect_bbox(rect.abs()))
        } else {
            ClipElement::Path(Path::from_rect(rect).transformed(transform))
        };
        self.elements.push(element);
    }

    /// Intersect the clip with `path` mapped through `transform`.
    pub fn clip_path(&mut self, path: &Path, transform: Affine) {
        let device = path.transformed(transform);
        let element = match device.as_rect() {
            Some(rect) => ClipElement::Rect(rect),
            None => ClipElement::Path(device),
        };
        self.elements.push(element);
    }

    /// Device-space bounds of the clip, limited to `device_bounds`.
    pub fn bounds(&self, device_bounds: Rect) -> Rect {
        self.elements
            .iter()
            .fold(device_bounds, |acc, element| acc.intersect(element.bounds()))
    }

    /// Reduce the clip to device-space paths whose intersection is the clip
    /// region.
    ///
    /// Rectangles are intersected with each other and then with every path
    /// element, so the result holds one layer per path element, or a single
    /// rectangle when the stack only holds rectangles. A path that is not
    /// contained in the rectangle is flattened and clipped against it; curves
    /// become polylines within a quarter of a device pixel of the original.
    ///
    /// An empty clip region yields a single empty path. A wide-open stack
    /// yields no layers.
    pub fn layers(&self) -> Vec<Path> {
        let mut rect: Option<Rect> = None;
        let mut paths: Vec<&Path> = Vec::new();
        for element in &self.elements {
            match element {
                ClipElement::Rect(r) => {
                    rect = Some(rect.map_or(*r, |acc| acc.intersect(*r)));
                }
                ClipElement::Path(p) => paths.push(p),
            }
        }

        if let Some(rect) = rect
            && rect.is_zero_area()
        {
            return vec![Path::default()];
        }
        let Some(rect) = rect else {
            return paths.into_iter().cloned().collect();
        };
        if paths.is_empty() {
            return vec![Path::from_rect(rect)];
        }

        let mut layers = Vec::with_capacity(paths.len());
        for path in paths {
            let layer = clip_path_to_rect(path, rect);
            if layer.is_empty() {
                return vec![Path::default()];
            }
            layers.push(layer);
        }
        layers
    }
}

/// Maximum distance between a clip curve and the polyline replacing it.
const FLATTEN_TOLERANCE: f64 = 0.25;

/// Intersect `path` with `rect`, keeping the fill rule.
fn clip_path_to_rect(path: &Path, rect: Rect) -> Path {
    let bounds = path.bounds();
    if rect.contains_rect(bounds) {
        return path.clone();
    }
    if rect.intersect(bounds).is_zero_area() {
        return Path::default();
    }

    let mut polygons: Vec<Vec<Point>> = Vec::new();
    kurbo::flatten(path.geometry().iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => polygons.push(vec![p]),
        PathEl::LineTo(p) => match polygons.last_mut() {
            Some(polygon) => polygon.push(p),
            None => polygons.push(vec![p]),
        },
        // Only lines remain after flattening; every subpath is filled as closed.
        PathEl::QuadTo(..) | PathEl::CurveTo(..) | PathEl::ClosePath => {}
    });
    log::trace!("clipping {} subpaths against {rect:?}", polygons.len());

    let mut clipped = BezPath::new();
    for polygon in &polygons {
        let polygon = clip_polygon(polygon, rect);
        let Some((first, rest)) = polygon.split_first() else {
            continue;
        };
        if rest.len() < 2 {
            continue;
        }
        clipped.move_to(*first);
        for point in rest {
            clipped.line_to(*point);
        }
        clipped.close_path();
    }
    Path::new(clipped, path.fill_rule())
}

/// Sutherland-Hodgman clipping of a closed polygon against `rect`.
///
/// Each output vertex lies inside `rect` and the vertex order is kept, so
/// winding numbers inside the rectangle are unchanged.
fn clip_polygon(polygon: &[Point], rect: Rect) -> Vec<Point> {
    let edges: [(fn(Point, Rect) -> bool, fn(Point, Point, Rect) -> Point); 4] = [
        (|p, r| p.x >= r.x0, |a, b, r| at_x(a, b, r.x0)),
        (|p, r| p.x <= r.x1, |a, b, r| at_x(a, b, r.x1)),
        (|p, r| p.y >= r.y0, |a, b, r| at_y(a, b, r.y0)),
        (|p, r| p.y <= r.y1, |a, b, r| at_y(a, b, r.y1)),
    ];

    let mut output = polygon.to_vec();
    for (inside, crossing) in edges {
        let input = core::mem::take(&mut output);
        let Some(&last) = input.last() else {
            break;
        };
        let mut previous = last;
        for &current in &input {
            match (inside(previous, rect), inside(current, rect)) {
                (true, true) => output.push(current),
                (true, false) => output.push(crossing(previous, current, rect)),
                (false, true) => {
                    output.push(crossing(previous, current, rect));
                    output.push(current);
                }
                (false, false) => {}
            }
            previous = current;
        }
    }
    output
}

/// The point on segment `a`-`b` with the given x; the segment must cross it.
fn at_x(a: Point, b: Point, x: f64) -> Point {
    let t = (x - a.x) / (b.x - a.x);
    Point::new(x, a.y + t * (b.y - a.y))
}

/// The point on segment `a`-`b` with the given y; the segment must cross it.
fn at_y(a: Point, b: Point, y: f64) -> Point {
    let t = (y - a.y) / (b.y - a.y);
    Point::new(a.x + t * (b.x - a.x), y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FillRule;
    use kurbo::{Shape, Vec2};

    fn triangle() -> Path {
        Path::from_polygon(
            &[
                Point::new(0.0, 0.0),
                Point::new(40.0, 0.0),
                Point::new(20.0, 30.0),
            ],
            true,
        )
        .with_fill_rule(FillRule::EvenOdd)
    }

    #[test]
    fn new_stack_is_wide_open() {
        let stack = ClipStack::new();
        assert!(stack.is_wide_open());
        let device = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(stack.bounds(device), device);
    }

    fn only_layer(stack: &ClipStack) -> Path {
        let mut layers = stack.layers();
        assert_eq!(layers.len(), 1, "expected a single clip layer");
        layers.remove(0)
    }

    #[test]
    fn rects_intersect_in_device_space() {
        let mut stack = ClipStack::new();
        stack.clip_rect(Rect::new(0.0, 0.0, 50.0, 50.0), Affine::IDENTITY);
        stack.clip_rect(
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Affine::translate(Vec2::new(10.0, 20.0)),
        );
        assert!(!stack.is_wide_open());
        assert_eq!(
            only_layer(&stack).as_rect(),
            Some(Rect::new(10.0, 20.0, 50.0, 50.0))
        );
    }

    #[test]
    fn disjoint_rects_flatten_to_empty_path() {
        let mut stack = ClipStack::new();
        stack.clip_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Affine::IDENTITY);
        stack.clip_rect(Rect::new(20.0, 20.0, 30.0, 30.0), Affine::IDENTITY);
        assert!(only_layer(&stack).is_empty());
    }

    #[test]
    fn wide_open_stack_has_no_layers() {
        assert!(ClipStack::new().layers().is_empty());
    }

    #[test]
    fn rotated_rect_becomes_path() {
        let mut stack = ClipStack::new();
        stack.clip_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Affine::rotate(0.3));
        let path = only_layer(&stack);
        assert!(!path.is_empty());
        assert_eq!(path.as_rect(), None);
    }

    #[test]
    fn path_clip_keeps_fill_rule() {
        let mut stack = ClipStack::new();
        stack.clip_path(&triangle(), Affine::IDENTITY);
        let path = only_layer(&stack);
        assert_eq!(path.fill_rule(), FillRule::EvenOdd);
        assert_eq!(path, triangle());
    }

    #[test]
    fn rect_shaped_path_clip_is_stored_as_rect() {
        let mut stack = ClipStack::new();
        stack.clip_path(
            &Path::from_rect(Rect::new(0.0, 0.0, 5.0, 5.0)),
            Affine::scale(2.0),
        );
        assert_eq!(
            only_layer(&stack).as_rect(),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn rect_cuts_path_to_intersection() {
        let mut stack = ClipStack::new();
        stack.clip_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Affine::IDENTITY);
        stack.clip_path(&triangle(), Affine::IDENTITY);
        let path = only_layer(&stack);
        assert_eq!(path.fill_rule(), FillRule::EvenOdd);
        assert_eq!(path.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
        let points: Vec<Point> = path
            .geometry()
            .elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], Point::new(10.0, 10.0));
        assert!((points[1].x - 20.0 / 3.0).abs() < 1e-9);
        assert_eq!(points[1].y, 10.0);
        assert_eq!(points[2..], [Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    }

    #[test]
    fn rect_pushed_after_path_still_cuts_it() {
        let mut stack = ClipStack::new();
        stack.clip_path(&triangle(), Affine::IDENTITY);
        stack.clip_rect(Rect::new(30.0, 0.0, 100.0, 100.0), Affine::IDENTITY);
        let path = only_layer(&stack);
        assert_eq!(path.bounds().x0, 30.0);
        assert!(path.bounds().x1 <= 40.0);
        assert!(path.geometry().contains(Point::new(32.0, 1.0)));
        assert!(!path.geometry().contains(Point::new(20.0, 1.0)));
    }

    #[test]
    fn curved_path_is_clipped_inside_rect() {
        let mut stack = ClipStack::new();
        let circle = Path::new(
            kurbo::Circle::new((0.0, 0.0), 10.0).to_path(0.1),
            FillRule::NonZero,
        );
        stack.clip_path(&circle, Affine::IDENTITY);
        stack.clip_rect(Rect::new(0.0, -20.0, 20.0, 20.0), Affine::IDENTITY);
        let path = only_layer(&stack);
        let bounds = path.bounds();
        assert!(bounds.x0 >= 0.0, "{bounds:?}");
        assert!(bounds.x1 <= 10.1, "{bounds:?}");
        assert!(path.geometry().contains(Point::new(5.0, 0.0)));
        assert!(!path.geometry().contains(Point::new(-5.0, 0.0)));
    }

    #[test]
    fn path_outside_rect_empties_clip() {
        let mut stack = ClipStack::new();
        stack.clip_rect(Rect::new(50.0, 50.0, 60.0, 60.0), Affine::IDENTITY);
        stack.clip_path(&triangle(), Affine::IDENTITY);
        assert!(only_layer(&stack).is_empty());
    }

    #[test]
    fn several_paths_stay_separate_layers() {
        let mut stack = ClipStack::new();
        stack.clip_path(&triangle(), Affine::IDENTITY);
        stack.clip_path(&triangle(), Affine::translate(Vec2::new(10.0, 0.0)));
        stack.clip_rect(Rect::new(0.0, 0.0, 100.0, 100.0), Affine::IDENTITY);
        let layers = stack.layers();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0], triangle());
        assert_eq!(
            layers[1],
            triangle().transformed(Affine::translate(Vec2::new(10.0, 0.0)))
        );
    }

    #[test]
    fn save_restore() {
        let mut stack = ClipStack::new();
        stack.save();
        stack.clip_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Affine::IDENTITY);
        assert!(!stack.is_wide_open());
        stack.restore();
        assert!(stack.is_wide_open());
        // Unbalanced restore is a no-op.
        stack.restore();
        assert!(stack.is_wide_open());
    }

    #[test]
    fn bounds_are_limited_to_device() {
        let mut stack = ClipStack::new();
        stack.clip_rect(Rect::new(-10.0, 5.0, 500.0, 20.0), Affine::IDENTITY);
        assert_eq!(
            stack.bounds(Rect::new(0.0, 0.0, 100.0, 100.0)),
            Rect::new(0.0, 5.0, 100.0, 20.0)
        );
    }
}
