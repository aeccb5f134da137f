// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, BezPath, PathEl, Point, Rect, RoundedRect, Shape};

use crate::FillRule;

/// Flattening tolerance used when lowering curved shapes to paths.
const SHAPE_TOLERANCE: f64 = 0.1;

/// Path geometry together with the rule used to decide its interior.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    geometry: BezPath,
    fill_rule: FillRule,
}

impl Default for Path {
    fn default() -> Self {
        Self {
            geometry: BezPath::new(),
            fill_rule: FillRule::NonZero,
        }
    }
}

impl From<BezPath> for Path {
    fn from(geometry: BezPath) -> Self {
        Self::new(geometry, FillRule::NonZero)
    }
}

impl Path {
    /// Create a path from geometry and a fill rule.
    #[inline]
    pub fn new(geometry: BezPath, fill_rule: FillRule) -> Self {
        Self {
            geometry,
            fill_rule,
        }
    }

    /// A closed, clockwise rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        let mut geometry = BezPath::new();
        geometry.move_to((rect.x0, rect.y0));
        geometry.line_to((rect.x1, rect.y0));
        geometry.line_to((rect.x1, rect.y1));
        geometry.line_to((rect.x0, rect.y1));
        geometry.close_path();
        geometry.into()
    }

    /// A rounded rectangle lowered to curves.
    pub fn from_rounded_rect(rect: RoundedRect) -> Self {
        rect.to_path(SHAPE_TOLERANCE).into()
    }

    /// A polyline through `points`, closed when `close` is set.
    ///
    /// Returns an empty path for an empty slice.
    pub fn from_polygon(points: &[Point], close: bool) -> Self {
        let mut geometry = BezPath::new();
        let Some((first, rest)) = points.split_first() else {
            return Self::default();
        };
        geometry.move_to(*first);
        for point in rest {
            geometry.line_to(*point);
        }
        if close {
            geometry.close_path();
        }
        geometry.into()
    }

    /// A single line segment.
    pub fn from_line(p0: Point, p1: Point) -> Self {
        Self::from_polygon(&[p0, p1], false)
    }

    /// The underlying geometry.
    #[inline]
    pub fn geometry(&self) -> &BezPath {
        &self.geometry
    }

    /// The fill rule.
    #[inline]
    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    /// Returns this path with a different fill rule.
    #[inline]
    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    /// Returns `true` if the path has no drawing segments.
    ///
    /// A path consisting only of `MoveTo`/`ClosePath` elements is empty.
    pub fn is_empty(&self) -> bool {
        self.geometry
            .elements()
            .iter()
            .all(|el| matches!(el, PathEl::MoveTo(_) | PathEl::ClosePath))
    }

    /// Bounding box of the geometry, or [`Rect::ZERO`] for an empty path.
    pub fn bounds(&self) -> Rect {
        if self.is_empty() {
            Rect::ZERO
        } else {
            self.geometry.bounding_box()
        }
    }

    /// Returns the path mapped through `transform`.
    pub fn transformed(&self, transform: Affine) -> Self {
        let mut geometry = self.geometry.clone();
        geometry.apply_affine(transform);
        Self::new(geometry, self.fill_rule)
    }

    /// If this path is exactly one closed axis-aligned rectangle, returns it.
    ///
    /// The rectangle must be a single subpath of four straight, alternating
    /// horizontal/vertical edges, closed either with `ClosePath` or by
    /// returning to the starting point. Degenerate (zero-area) outlines are
    /// not rectangles.
    pub fn as_rect(&self) -> Option<Rect> {
        let mut corners = [Point::ZERO; 5];
        let mut count = 0;
        let mut closed = false;

        for (i, el) in self.geometry.elements().iter().enumerate() {
            match *el {
                PathEl::MoveTo(p) if i == 0 => {
                    corners[0] = p;
                    count = 1;
                }
                PathEl::LineTo(p) if i > 0 && !closed => {
                    if count == corners.len() {
                        return None;
                    }
                    corners[count] = p;
                    count += 1;
                }
                PathEl::ClosePath if i > 0 => closed = true,
                // A trailing move does not start a new contour.
                PathEl::MoveTo(_) if closed => {}
                _ => return None,
            }
        }

        if count == 5 {
            if corners[4] != corners[0] {
                return None;
            }
            count = 4;
        } else if !closed {
            return None;
        }
        if count != 4 {
            return None;
        }

        let mut previous_horizontal = None;
        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            let horizontal = a.y == b.y && a.x != b.x;
            let vertical = a.x == b.x && a.y != b.y;
            if horizontal == vertical {
                return None;
            }
            if previous_horizontal == Some(horizontal) {
                return None;
            }
            previous_horizontal = Some(horizontal);
        }

        Some(Rect::from_points(corners[0], corners[2]).abs())
    }
}
