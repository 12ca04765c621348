//! Pixel-to-physical coordinate transform.
//!
//! ```text
//! phys_x = pixel_x × scale + origin_x
//! phys_y = pixel_y × scale + origin_y
//! ```
//!
//! One transform is built per run and copied into every curve, so all
//! curves from the same bitmap share the same physical frame.

use serde::{Deserialize, Serialize};

use crate::types::{PhysicalPoint, PixelPoint, PlotConfig};

/// Uniform scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateTransform {
    scale: f64,
    origin: PhysicalPoint,
}

impl CoordinateTransform {
    /// Create a transform mapping pixel `(0, 0)` to `origin` with `scale`
    /// physical units per pixel.
    #[must_use]
    pub const fn new(scale: f64, origin: PhysicalPoint) -> Self {
        Self { scale, origin }
    }

    /// The transform described by a run configuration.
    #[must_use]
    pub const fn from_config(config: &PlotConfig) -> Self {
        Self::new(config.scale, config.origin)
    }

    /// Physical units per pixel.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Physical position of pixel `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> PhysicalPoint {
        self.origin
    }

    /// Map a pixel to physical space.
    #[must_use]
    pub fn apply(&self, p: PixelPoint) -> PhysicalPoint {
        self.apply_xy(f64::from(p.x), f64::from(p.y))
    }

    /// Map a fractional pixel position to physical space.
    #[must_use]
    pub fn apply_xy(&self, x: f64, y: f64) -> PhysicalPoint {
        PhysicalPoint::new(
            x.mul_add(self.scale, self.origin.x),
            y.mul_add(self.scale, self.origin.y),
        )
    }
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::new(1.0, PhysicalPoint::new(0.0, 0.0))
    }
}
