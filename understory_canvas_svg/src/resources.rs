// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// A category of resource defined under `<defs>` and referenced by id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `<linearGradient>`.
    Gradient,
    /// `<clipPath>`.
    Clip,
    /// A `<path>` referenced by `<textPath>`.
    Path,
    /// An embedded `<image>`.
    Image,
    /// An image `<pattern>`.
    Pattern,
    /// A color `<filter>`.
    ColorFilter,
}

impl ResourceKind {
    const COUNT: usize = 6;

    /// The id prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Gradient => "gradient",
            Self::Clip => "clip",
            Self::Path => "path",
            Self::Image => "img",
            Self::Pattern => "pattern",
            Self::ColorFilter => "cfilter",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Gradient => 0,
            Self::Clip => 1,
            Self::Path => 2,
            Self::Image => 3,
            Self::Pattern => 4,
            Self::ColorFilter => 5,
        }
    }
}

/// Issues document-unique resource ids.
///
/// Each kind has its own counter, starting at zero; ids look like
/// `clip_0`, `clip_1`, `gradient_0`. Identical resources are not
/// deduplicated: every request yields a fresh id.
#[derive(Clone, Debug, Default)]
pub struct ResourceBucket {
    counters: [u32; ResourceKind::COUNT],
}

impl ResourceBucket {
    /// A bucket with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id of `kind`.
    pub fn allocate(&mut self, kind: ResourceKind) -> String {
        let counter = &mut self.counters[kind.index()];
        let id = format!("{}_{}", kind.prefix(), counter);
        *counter += 1;
        log::trace!("allocated resource id {id}");
        id
    }

    /// How many ids of `kind` have been handed out.
    pub fn allocated(&self, kind: ResourceKind) -> u32 {
        self.counters[kind.index()]
    }
}
