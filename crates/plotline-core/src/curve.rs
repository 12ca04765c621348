//! Time-parameterized curves.
//!
//! A [`TimeParameterizedCurve`] owns one pixel chain and a time axis
//! built from it: `axis[0] = 0` and each following entry adds the
//! distance to the next pixel divided by the pen speed. Position queries
//! interpolate linearly between neighbouring pixels and map the result to
//! physical space.
//!
//! # Forward-only queries
//!
//! Each curve keeps a private cursor into its axis. A query moves the
//! cursor forward past every timestamp `<= t` and never moves it back, so
//! a monotone scan over the whole curve costs amortized O(1) per query.
//! Querying a time earlier than the cursor's timestamp is a caller bug:
//! debug builds assert, release builds answer with the cursor's pixel.

use crate::transform::CoordinateTransform;
use crate::types::{PhysicalPoint, PixelChain, PlotError};

/// A path the pen follows over time.
pub trait Curve {
    /// Time needed to draw the whole curve.
    fn total_time(&self) -> f64;

    /// Pen position at time `t`.
    ///
    /// Successive calls on the same curve must pass non-decreasing `t`.
    fn position_at(&mut self, t: f64) -> PhysicalPoint;
}

/// One traced chain with its time axis and a forward query cursor.
#[derive(Debug, Clone)]
pub struct TimeParameterizedCurve {
    chain: PixelChain,
    axis: Vec<f64>,
    transform: CoordinateTransform,
    cursor: usize,
}

impl TimeParameterizedCurve {
    /// Build a curve over `chain`, drawn at `speed` pixel lengths per time
    /// unit.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::InvalidConfig`] if `chain` is empty or `speed`
    /// is not a positive finite number.
    pub fn new(
        chain: PixelChain,
        speed: f64,
        transform: CoordinateTransform,
    ) -> Result<Self, PlotError> {
        if chain.is_empty() {
            return Err(PlotError::InvalidConfig("curve needs at least one pixel".to_owned()));
        }
        if !(speed.is_finite() && speed > 0.0) {
            return Err(PlotError::InvalidConfig(format!(
                "speed must be positive and finite, got {speed}"
            )));
        }
        Ok(Self::from_checked(chain, speed, transform))
    }

    /// Build a curve from a non-empty chain and a speed already checked by
    /// [`PlotConfig::validate`](crate::PlotConfig::validate).
    pub(crate) fn from_checked(
        chain: PixelChain,
        speed: f64,
        transform: CoordinateTransform,
    ) -> Self {
        debug_assert!(!chain.is_empty(), "curve built from an empty chain");
        debug_assert!(speed > 0.0, "speed must be positive, got {speed}");

        let points = chain.points();
        let mut axis = Vec::with_capacity(points.len());
        let mut time = 0.0;
        axis.push(time);
        for pair in points.windows(2) {
            time += pair[0].distance(pair[1]) / speed;
            axis.push(time);
        }

        Self {
            chain,
            axis,
            transform,
            cursor: 0,
        }
    }

    /// The pixel chain this curve follows.
    #[must_use]
    pub const fn chain(&self) -> &PixelChain {
        &self.chain
    }

    /// Cumulative time at each pixel of the chain.
    #[must_use]
    pub fn time_axis(&self) -> &[f64] {
        &self.axis
    }

    /// The transform applied to every answer.
    #[must_use]
    pub const fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Index of the segment the last query landed in.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of pixels in the chain.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always `false`: curves are never built from empty chains.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Physical start point of the curve.
    #[must_use]
    pub fn start(&self) -> Option<PhysicalPoint> {
        self.chain.first().map(|&p| self.transform.apply(p))
    }

    /// Physical end point of the curve.
    #[must_use]
    pub fn end(&self) -> Option<PhysicalPoint> {
        self.chain.last().map(|&p| self.transform.apply(p))
    }
}

impl Curve for TimeParameterizedCurve {
    fn total_time(&self) -> f64 {
        self.axis.last().copied().unwrap_or(0.0)
    }

    fn position_at(&mut self, t: f64) -> PhysicalPoint {
        let points = self.chain.points();
        let last = self.axis.len().saturating_sub(1);
        debug_assert!(
            t >= self.axis[self.cursor],
            "time went backwards: t={t} < cursor time {}",
            self.axis[self.cursor],
        );

        while self.cursor < last && self.axis[self.cursor + 1] <= t {
            self.cursor += 1;
        }

        let i = self.cursor;
        if i == last {
            return self.transform.apply(points[i]);
        }

        let (t0, t1) = (self.axis[i], self.axis[i + 1]);
        let width = t1 - t0;
        // A zero-width interval is instantaneous; land on its far end.
        let ratio = if width > 0.0 {
            ((t - t0) / width).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let (a, b) = (points[i], points[i + 1]);
        let x = (1.0 - ratio).mul_add(f64::from(a.x), ratio * f64::from(b.x));
        let y = (1.0 - ratio).mul_add(f64::from(a.y), ratio * f64::from(b.y));
        self.transform.apply_xy(x, y)
    }
}
