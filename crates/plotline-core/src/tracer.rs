//! Pixel tracers: sequential walks over the connected components of a
//! bitmap.
//!
//! The engine consumes tracers only through [`PixelChainTracer`]. Two
//! bitmap-backed strategies ship with the crate and are selected at
//! runtime through [`TracerKind`]:
//!
//! - [`PixelWalkTracer`] walks 8-connected ink pixels directly, which is
//!   what you want for thin line art.
//! - Border following (Suzuki-Abe, via `imageproc`) traces the outline of
//!   each filled region and replays the outlines through a
//!   [`ChainListTracer`].

use std::collections::VecDeque;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::types::{PixelChain, PixelPoint};

/// One answer from [`PixelChainTracer::next_point`].
///
/// Both variants carry a valid pixel. The variant says whether another
/// pixel follows *this one* in the current component, so the final pixel
/// arrives together with the end signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPoint {
    /// More pixels follow in this component.
    Continues(PixelPoint),
    /// This is the last pixel of the component.
    Last(PixelPoint),
}

impl NextPoint {
    /// The pixel carried by this step.
    #[must_use]
    pub const fn point(self) -> PixelPoint {
        match self {
            Self::Continues(p) | Self::Last(p) => p,
        }
    }

    /// Whether the component has further pixels after this one.
    #[must_use]
    pub const fn has_more(self) -> bool {
        matches!(self, Self::Continues(_))
    }
}

/// Sequential, stateful walk over the components of one bitmap.
///
/// Callers alternate between [`begin_next_component`](Self::begin_next_component)
/// and draining the component with [`next_point`](Self::next_point) until
/// it returns [`NextPoint::Last`]. Only one component is open at a time.
pub trait PixelChainTracer {
    /// Advance to the next connected component.
    ///
    /// Returns `false` once the bitmap is exhausted; every later call also
    /// returns `false`.
    fn begin_next_component(&mut self) -> bool;

    /// Yield the next pixel of the current component.
    fn next_point(&mut self) -> NextPoint;
}

impl<T: PixelChainTracer + ?Sized> PixelChainTracer for &mut T {
    fn begin_next_component(&mut self) -> bool {
        (**self).begin_next_component()
    }

    fn next_point(&mut self) -> NextPoint {
        (**self).next_point()
    }
}

/// Selects which bitmap tracer to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TracerKind {
    /// 8-connected walk over ink pixels. Each pixel is visited once.
    #[default]
    PixelWalk,

    /// Suzuki-Abe border following via `imageproc::contours::find_contours`.
    ///
    /// Filled shapes become their outlines; 1-pixel lines come back as
    /// doubled borders.
    BorderFollowing,
}

impl TracerKind {
    /// Build a tracer of this kind over a binary bitmap.
    ///
    /// Non-zero pixels are ink.
    #[must_use]
    pub fn tracer(self, image: &GrayImage) -> BitmapTracer {
        match self {
            Self::PixelWalk => BitmapTracer::PixelWalk(PixelWalkTracer::new(image)),
            Self::BorderFollowing => BitmapTracer::Chains(trace_border_following(image)),
        }
    }
}

/// A bitmap tracer built by [`TracerKind::tracer`].
#[derive(Debug, Clone)]
pub enum BitmapTracer {
    /// See [`PixelWalkTracer`].
    PixelWalk(PixelWalkTracer),
    /// Pre-traced outlines replayed one by one.
    Chains(ChainListTracer),
}

impl PixelChainTracer for BitmapTracer {
    fn begin_next_component(&mut self) -> bool {
        match self {
            Self::PixelWalk(t) => t.begin_next_component(),
            Self::Chains(t) => t.begin_next_component(),
        }
    }

    fn next_point(&mut self) -> NextPoint {
        match self {
            Self::PixelWalk(t) => t.next_point(),
            Self::Chains(t) => t.next_point(),
        }
    }
}

/// Replays a list of pre-built chains as tracer components.
///
/// Empty chains are dropped on construction since a component always has
/// at least one pixel.
#[derive(Debug, Clone, Default)]
pub struct ChainListTracer {
    pending: VecDeque<PixelChain>,
    current: VecDeque<PixelPoint>,
    last: PixelPoint,
}

impl ChainListTracer {
    /// Create a tracer that yields `chains` in order.
    #[must_use]
    pub fn new(chains: impl IntoIterator<Item = PixelChain>) -> Self {
        Self {
            pending: chains.into_iter().filter(|c| !c.is_empty()).collect(),
            current: VecDeque::new(),
            last: PixelPoint::new(0, 0),
        }
    }

    /// Number of components not yet started.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl PixelChainTracer for ChainListTracer {
    fn begin_next_component(&mut self) -> bool {
        match self.pending.pop_front() {
            Some(chain) => {
                self.current = chain.into_points().into();
                true
            }
            None => {
                self.current.clear();
                false
            }
        }
    }

    fn next_point(&mut self) -> NextPoint {
        // Draining past the end repeats the final pixel.
        let Some(point) = self.current.pop_front() else {
            return NextPoint::Last(self.last);
        };
        self.last = point;
        if self.current.is_empty() {
            NextPoint::Last(point)
        } else {
            NextPoint::Continues(point)
        }
    }
}

/// Neighbour offsets in walk preference order: edge-adjacent first, then
/// diagonals.
const NEIGHBOURS: [(i32, i32); 8] = [
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

/// Greedy 8-connected walk over the ink pixels of a bitmap.
///
/// Components start at the first unconsumed ink pixel in raster order.
/// From there the walk repeatedly steps to the first unconsumed ink
/// neighbour (see [`NEIGHBOURS`]) and consumes it. A component ends when
/// the current pixel has no such neighbour, so a branching shape is split
/// into several components and every ink pixel is yielded exactly once.
#[derive(Debug, Clone)]
pub struct PixelWalkTracer {
    ink: Vec<bool>,
    width: usize,
    height: usize,
    scan: usize,
    current: Option<PixelPoint>,
    last: PixelPoint,
}

impl PixelWalkTracer {
    /// Create a walker over `image`. Non-zero pixels are ink.
    #[must_use]
    pub fn new(image: &GrayImage) -> Self {
        Self {
            ink: image.pixels().map(|p| p.0[0] != 0).collect(),
            width: image.width() as usize,
            height: image.height() as usize,
            scan: 0,
            current: None,
            last: PixelPoint::new(0, 0),
        }
    }

    /// Number of ink pixels not yet yielded or opened.
    #[must_use]
    pub fn remaining_ink(&self) -> usize {
        self.ink.iter().filter(|&&b| b).count()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn point_at(&self, index: usize) -> Option<PixelPoint> {
        let x = i32::try_from(index % self.width).ok()?;
        let y = i32::try_from(index / self.width).ok()?;
        Some(PixelPoint::new(x, y))
    }

    /// Consume and return the first unconsumed ink neighbour of `p`.
    fn take_neighbour(&mut self, p: PixelPoint) -> Option<PixelPoint> {
        for (dx, dy) in NEIGHBOURS {
            let (x, y) = (p.x + dx, p.y + dy);
            if let Some(i) = self.index(x, y)
                && self.ink[i]
            {
                self.ink[i] = false;
                return Some(PixelPoint::new(x, y));
            }
        }
        None
    }
}

impl PixelChainTracer for PixelWalkTracer {
    fn begin_next_component(&mut self) -> bool {
        self.current = None;
        while self.scan < self.ink.len() {
            let i = self.scan;
            self.scan += 1;
            if self.ink[i] {
                self.ink[i] = false;
                self.current = self.point_at(i);
                return self.current.is_some();
            }
        }
        false
    }

    fn next_point(&mut self) -> NextPoint {
        let Some(point) = self.current else {
            return NextPoint::Last(self.last);
        };
        self.last = point;
        self.current = self.take_neighbour(point);
        if self.current.is_some() {
            NextPoint::Continues(point)
        } else {
            NextPoint::Last(point)
        }
    }
}

/// Suzuki-Abe border following via `imageproc::contours::find_contours`.
fn trace_border_following(image: &GrayImage) -> ChainListTracer {
    let contours: Vec<imageproc::contours::Contour<i32>> =
        imageproc::contours::find_contours(image);

    ChainListTracer::new(contours.into_iter().map(|c| {
        c.points
            .into_iter()
            .map(|p| PixelPoint::new(p.x, p.y))
            .collect::<PixelChain>()
    }))
}
