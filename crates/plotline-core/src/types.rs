//! Shared types for the plotline curve engine.

use serde::{Deserialize, Serialize};

use crate::sampler::SampledCurve;
use crate::source::SourceStats;
use crate::tracer::TracerKind;

/// Re-export `GrayImage` so downstream crates can hand bitmaps to the
/// tracers without depending on `image` directly.
pub use image::GrayImage;

/// A pixel position in bitmap space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Column (pixels from left edge).
    pub x: i32,
    /// Row (pixels from top edge).
    pub y: i32,
}

impl PixelPoint {
    /// Create a new pixel point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another pixel.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        dx.hypot(dy)
    }
}

/// A point in physical (plotter) space, typically millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalPoint {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl PhysicalPoint {
    /// Create a new physical point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Ordered pixels produced by one tracer component walk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelChain(Vec<PixelPoint>);

impl PixelChain {
    /// Create a chain from a vector of pixels.
    #[must_use]
    pub const fn new(points: Vec<PixelPoint>) -> Self {
        Self(points)
    }

    /// Append a pixel to the end of the chain.
    pub fn push(&mut self, point: PixelPoint) {
        self.0.push(point);
    }

    /// Returns `true` if the chain has no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of pixels in the chain.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first pixel, if any.
    #[must_use]
    pub fn first(&self) -> Option<&PixelPoint> {
        self.0.first()
    }

    /// Returns the last pixel, if any.
    #[must_use]
    pub fn last(&self) -> Option<&PixelPoint> {
        self.0.last()
    }

    /// Returns a slice of all pixels.
    #[must_use]
    pub fn points(&self) -> &[PixelPoint] {
        &self.0
    }

    /// Consumes the chain and returns the underlying vector.
    #[must_use]
    pub fn into_points(self) -> Vec<PixelPoint> {
        self.0
    }
}

impl FromIterator<PixelPoint> for PixelChain {
    fn from_iter<I: IntoIterator<Item = PixelPoint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Configuration for one plotting run.
///
/// Everything here is fixed once a
/// [`MultiCurveSource`](crate::MultiCurveSource) is built from it.
/// Call [`validate`](Self::validate) (the source constructor does) to
/// reject values the engine cannot work with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Pen speed in pixel lengths per time unit. Must be > 0.
    ///
    /// Timing is measured along the traced pixel chain, before `scale`
    /// is applied, so the physical speed is `speed * scale`.
    pub speed: f64,

    /// Physical position of pixel `(0, 0)`.
    pub origin: PhysicalPoint,

    /// Physical units per pixel (e.g. mm/pixel). Must be > 0.
    pub scale: f64,

    /// Components with fewer pixels than this are dropped as noise.
    /// Must be at least 1.
    pub min_curve_pixels: usize,

    /// Luminance below which a pixel counts as ink.
    pub threshold: u8,

    /// Treat light pixels as ink instead of dark ones.
    pub invert: bool,

    /// Which bitmap tracer walks the components.
    pub tracer: TracerKind,
}

impl PlotConfig {
    /// Default pen speed (pixels per second).
    pub const DEFAULT_SPEED: f64 = 40.0;
    /// Default physical size of one pixel (mm).
    pub const DEFAULT_SCALE: f64 = 0.5;
    /// Default minimum component size in pixels.
    pub const DEFAULT_MIN_CURVE_PIXELS: usize = 5;
    /// Default ink threshold.
    pub const DEFAULT_THRESHOLD: u8 = 128;

    /// Check that every numeric parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::InvalidConfig`] if `speed` or `scale` is not a
    /// positive finite number, if `origin` is not finite, or if
    /// `min_curve_pixels` is zero.
    pub fn validate(&self) -> Result<(), PlotError> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(PlotError::InvalidConfig(format!(
                "speed must be positive and finite, got {}",
                self.speed
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(PlotError::InvalidConfig(format!(
                "scale must be positive and finite, got {}",
                self.scale
            )));
        }
        if !(self.origin.x.is_finite() && self.origin.y.is_finite()) {
            return Err(PlotError::InvalidConfig(format!(
                "origin must be finite, got ({}, {})",
                self.origin.x, self.origin.y
            )));
        }
        if self.min_curve_pixels == 0 {
            return Err(PlotError::InvalidConfig(
                "min_curve_pixels must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            speed: Self::DEFAULT_SPEED,
            origin: PhysicalPoint::new(0.0, 0.0),
            scale: Self::DEFAULT_SCALE,
            min_curve_pixels: Self::DEFAULT_MIN_CURVE_PIXELS,
            threshold: Self::DEFAULT_THRESHOLD,
            invert: false,
            tracer: TracerKind::default(),
        }
    }
}

/// Result of running the full image-to-timed-curves pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotResult {
    /// Every kept curve, sampled at the requested time step.
    pub curves: Vec<SampledCurve>,

    /// Dimensions of the source bitmap in pixels.
    pub dimensions: Dimensions,

    /// How many components were traced, kept and skipped.
    pub stats: SourceStats,
}

impl PlotResult {
    /// Sum of the durations of all curves.
    #[must_use]
    pub fn total_time(&self) -> f64 {
        self.curves.iter().map(|c| c.total_time).sum()
    }
}

/// Errors that can occur while building or running a plot.
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A configuration value is out of range.
    #[error("invalid plot configuration: {0}")]
    InvalidConfig(String),

    /// Every traced component was shorter than the minimum.
    #[error("no curves found in the image")]
    NoCurves,
}
