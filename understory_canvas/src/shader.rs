// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shaders and color filters attached to a [`Paint`](crate::Paint).

use alloc::vec::Vec;

use kurbo::Point;

use crate::{Affine, BlendMode, Color, Extend, Image};

/// A color at a position along a gradient.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GradientStop {
    /// Position in `0..=1`.
    pub offset: f32,
    /// Color at this position.
    pub color: Color,
}

impl GradientStop {
    /// Create a stop.
    #[inline]
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// A gradient between two points.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    /// Start point, in shader space.
    pub start: Point,
    /// End point, in shader space.
    pub end: Point,
    /// Color stops, sorted by offset.
    pub stops: Vec<GradientStop>,
    /// Shader space to user space.
    pub local_transform: Affine,
}

/// A gradient radiating from a center point.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
    /// Center, in shader space.
    pub center: Point,
    /// Radius of the outermost stop.
    pub radius: f64,
    /// Color stops, sorted by offset.
    pub stops: Vec<GradientStop>,
    /// Shader space to user space.
    pub local_transform: Affine,
}

/// A gradient sweeping around a center point.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepGradient {
    /// Center, in shader space.
    pub center: Point,
    /// Start angle in degrees.
    pub start_angle: f32,
    /// End angle in degrees.
    pub end_angle: f32,
    /// Color stops, sorted by offset.
    pub stops: Vec<GradientStop>,
    /// Shader space to user space.
    pub local_transform: Affine,
}

/// An image used as a paint source.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageShader {
    /// Source image.
    pub image: Image,
    /// Tiling along x.
    pub x_extend: Extend,
    /// Tiling along y.
    pub y_extend: Extend,
    /// Shader space to user space.
    pub local_transform: Affine,
}

impl ImageShader {
    /// An image shader with the same tiling on both axes.
    pub fn new(image: Image, extend: Extend) -> Self {
        Self {
            image,
            x_extend: extend,
            y_extend: extend,
            local_transform: Affine::IDENTITY,
        }
    }
}

/// The kind of a gradient shader.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GradientKind {
    /// See [`LinearGradient`].
    Linear,
    /// See [`RadialGradient`].
    Radial,
    /// See [`SweepGradient`].
    Sweep,
}

/// A paint source.
#[derive(Clone, Debug, PartialEq)]
pub enum Shader {
    /// Linear gradient.
    LinearGradient(LinearGradient),
    /// Radial gradient.
    RadialGradient(RadialGradient),
    /// Sweep gradient.
    SweepGradient(SweepGradient),
    /// Image, optionally tiled.
    Image(ImageShader),
}

impl Shader {
    /// The gradient kind, or `None` for non-gradient shaders.
    pub fn gradient_kind(&self) -> Option<GradientKind> {
        match self {
            Self::LinearGradient(_) => Some(GradientKind::Linear),
            Self::RadialGradient(_) => Some(GradientKind::Radial),
            Self::SweepGradient(_) => Some(GradientKind::Sweep),
            Self::Image(_) => None,
        }
    }

    /// Returns the linear gradient, if this is one.
    pub fn as_linear_gradient(&self) -> Option<&LinearGradient> {
        match self {
            Self::LinearGradient(gradient) => Some(gradient),
            _ => None,
        }
    }

    /// Returns the image shader, if this is one.
    pub fn as_image(&self) -> Option<&ImageShader> {
        match self {
            Self::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Shader space to user space.
    pub fn local_transform(&self) -> Affine {
        match self {
            Self::LinearGradient(g) => g.local_transform,
            Self::RadialGradient(g) => g.local_transform,
            Self::SweepGradient(g) => g.local_transform,
            Self::Image(i) => i.local_transform,
        }
    }

    /// Returns `true` for an image shader that repeats along either axis.
    pub fn tiles_with_repeat(&self) -> bool {
        self.as_image()
            .is_some_and(|i| i.x_extend == Extend::Repeat || i.y_extend == Extend::Repeat)
    }
}

impl From<LinearGradient> for Shader {
    fn from(gradient: LinearGradient) -> Self {
        Self::LinearGradient(gradient)
    }
}

impl From<ImageShader> for Shader {
    fn from(shader: ImageShader) -> Self {
        Self::Image(shader)
    }
}

/// A filter applied to the colors a paint produces.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorFilter {
    /// Blend a constant color with the source using `mode`.
    Blend {
        /// The constant color.
        color: Color,
        /// How it is combined with the source.
        mode: BlendMode,
    },
    /// A 4x5 row-major color matrix.
    Matrix([f32; 20]),
}

impl ColorFilter {
    /// If this filter blends a single color, returns the color and mode.
    pub fn as_color_mode(&self) -> Option<(Color, BlendMode)> {
        match *self {
            Self::Blend { color, mode } => Some((color, mode)),
            Self::Matrix(_) => None,
        }
    }
}
