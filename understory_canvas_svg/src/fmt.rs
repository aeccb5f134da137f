// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Number, color, transform and path-data formatting.

use std::fmt::Write as _;

use kurbo::{BezPath, PathEl};
use understory_canvas::{Affine, Color, TransformKind};

/// Significant digits for coordinates, transforms and other scalars.
const SCALAR_DIGITS: usize = 6;
/// Significant digits for glyph positions.
const POSITION_DIGITS: usize = 8;

/// `%g`-style formatting: integral values without a fraction, everything
/// else rounded to `digits` significant digits with trailing zeros trimmed.
/// Very large or very small magnitudes use exponent notation.
fn fmt_significant(v: f64, digits: usize) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    if v == 0.0 {
        return String::from("0");
    }
    if v == v.trunc() && v.abs() < 1e15 {
        return format!("{v}");
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "decimal exponents of finite f64 values fit in i32"
    )]
    let exponent = v.abs().log10().floor() as i32;
    let precision = i32::try_from(digits).unwrap_or(i32::MAX);
    if exponent < -4 || exponent >= precision {
        let formatted = format!("{v:.prec$e}", prec = digits.saturating_sub(1));
        let (mantissa, exp) = formatted.split_once('e').unwrap_or((&formatted, "0"));
        return format!("{}e{exp}", trim_fraction(mantissa));
    }

    let decimals = usize::try_from(precision - 1 - exponent).unwrap_or(0);
    let formatted = format!("{v:.decimals$}");
    let trimmed = trim_fraction(&formatted);
    if trimmed == "-0" {
        String::from("0")
    } else {
        String::from(trimmed)
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

pub(crate) fn fmt_f32(v: f32) -> String {
    fmt_significant(f64::from(v), SCALAR_DIGITS)
}

pub(crate) fn fmt_scalar(v: f64) -> String {
    fmt_significant(v, SCALAR_DIGITS)
}

pub(crate) fn fmt_position(v: f64) -> String {
    fmt_significant(v, POSITION_DIGITS)
}

/// `#rrggbb`; alpha is carried separately by the opacity attributes.
pub(crate) fn svg_color(color: Color) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
}

/// Alpha in `0..=1`, or `None` when fully opaque.
pub(crate) fn svg_opacity(color: Color) -> Option<f32> {
    let a = color.to_rgba8().a;
    (a != u8::MAX).then(|| f32::from(a) / 255.0)
}

/// The most compact `transform` attribute value for a non-identity matrix.
pub(crate) fn svg_transform(xf: Affine) -> String {
    debug_assert!(xf != Affine::IDENTITY, "identity transforms are not written");

    // kurbo::Affine stores [a, b, c, d, e, f] corresponding to:
    // [ a c e ]
    // [ b d f ]
    // [ 0 0 1 ]
    let [a, b, c, d, e, f] = xf.as_coeffs();
    let kind = TransformKind::of(xf);
    if kind == TransformKind::TRANSLATE {
        format!("translate({} {})", fmt_scalar(e), fmt_scalar(f))
    } else if kind == TransformKind::SCALE {
        format!("scale({} {})", fmt_scalar(a), fmt_scalar(d))
    } else {
        format!(
            "matrix({} {} {} {} {} {})",
            fmt_scalar(a),
            fmt_scalar(b),
            fmt_scalar(c),
            fmt_scalar(d),
            fmt_scalar(e),
            fmt_scalar(f),
        )
    }
}

/// SVG path data (`d` attribute) for a path.
pub(crate) fn path_data(path: &BezPath) -> String {
    let mut d = String::new();
    for el in path.iter() {
        if !d.is_empty() {
            d.push(' ');
        }
        match el {
            PathEl::MoveTo(p) => {
                let _ = write!(d, "M{} {}", fmt_scalar(p.x), fmt_scalar(p.y));
            }
            PathEl::LineTo(p) => {
                let _ = write!(d, "L{} {}", fmt_scalar(p.x), fmt_scalar(p.y));
            }
            PathEl::QuadTo(p1, p2) => {
                let _ = write!(
                    d,
                    "Q{} {} {} {}",
                    fmt_scalar(p1.x),
                    fmt_scalar(p1.y),
                    fmt_scalar(p2.x),
                    fmt_scalar(p2.y)
                );
            }
            PathEl::CurveTo(p1, p2, p3) => {
                let _ = write!(
                    d,
                    "C{} {} {} {} {} {}",
                    fmt_scalar(p1.x),
                    fmt_scalar(p1.y),
                    fmt_scalar(p2.x),
                    fmt_scalar(p2.y),
                    fmt_scalar(p3.x),
                    fmt_scalar(p3.y)
                );
            }
            PathEl::ClosePath => d.push('Z'),
        }
    }
    d
}
