//! Multi-curve source: turns a tracer's components into curves, one at a
//! time.
//!
//! Each call to [`MultiCurve::next_curve`] opens tracer components until
//! one is long enough, then wraps it in a [`TimeParameterizedCurve`].
//! Components below `min_curve_pixels` are traced noise and are skipped
//! without error. Once the tracer runs out the source is finished for
//! good; it is not restartable.

use serde::{Deserialize, Serialize};

use crate::chain;
use crate::curve::{Curve, TimeParameterizedCurve};
use crate::tracer::{BitmapTracer, PixelChainTracer};
use crate::transform::CoordinateTransform;
use crate::types::{GrayImage, PlotConfig, PlotError};

/// A finite, lazily produced sequence of curves.
pub trait MultiCurve {
    /// The curve type produced.
    type Curve: Curve;

    /// Produce the next curve, or `None` once there are no more.
    fn next_curve(&mut self) -> Option<Self::Curve>;
}

/// Counters describing what a source has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    /// Components drained from the tracer.
    pub components: usize,
    /// Components dropped for being shorter than `min_curve_pixels`.
    pub skipped: usize,
    /// Curves handed out.
    pub curves: usize,
    /// Pixels across all handed-out curves.
    pub kept_pixels: usize,
    /// Pixels across all skipped components.
    pub skipped_pixels: usize,
}

/// Builds [`TimeParameterizedCurve`]s from the components of one tracer.
#[derive(Debug)]
pub struct MultiCurveSource<T> {
    tracer: T,
    transform: CoordinateTransform,
    speed: f64,
    min_curve_pixels: usize,
    exhausted: bool,
    stats: SourceStats,
}

impl<T: PixelChainTracer> MultiCurveSource<T> {
    /// Create a source over `tracer` using the speed, transform and
    /// minimum length from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::InvalidConfig`] if `config` fails
    /// [`PlotConfig::validate`].
    pub fn new(tracer: T, config: &PlotConfig) -> Result<Self, PlotError> {
        config.validate()?;
        Ok(Self {
            tracer,
            transform: CoordinateTransform::from_config(config),
            speed: config.speed,
            min_curve_pixels: config.min_curve_pixels,
            exhausted: false,
            stats: SourceStats::default(),
        })
    }

    /// The transform shared by every curve of this source.
    #[must_use]
    pub const fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> SourceStats {
        self.stats
    }

    /// Whether the tracer has reported its last component.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Give the tracer back, e.g. to inspect what it has left.
    pub fn into_tracer(self) -> T {
        self.tracer
    }
}

impl MultiCurveSource<BitmapTracer> {
    /// Create a source tracing a binary bitmap with the tracer chosen in
    /// `config`. Non-zero pixels are ink.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::InvalidConfig`] if `config` fails
    /// [`PlotConfig::validate`].
    pub fn from_bitmap(bitmap: &GrayImage, config: &PlotConfig) -> Result<Self, PlotError> {
        Self::new(config.tracer.tracer(bitmap), config)
    }
}

impl<T: PixelChainTracer> MultiCurve for MultiCurveSource<T> {
    type Curve = TimeParameterizedCurve;

    fn next_curve(&mut self) -> Option<TimeParameterizedCurve> {
        if self.exhausted {
            return None;
        }

        while self.tracer.begin_next_component() {
            let chain = chain::drain(&mut self.tracer);
            self.stats.components += 1;

            if chain.len() < self.min_curve_pixels {
                log::debug!(
                    "skipping component of {} pixel(s), minimum is {}",
                    chain.len(),
                    self.min_curve_pixels,
                );
                self.stats.skipped += 1;
                self.stats.skipped_pixels += chain.len();
                continue;
            }

            self.stats.curves += 1;
            self.stats.kept_pixels += chain.len();
            let curve = TimeParameterizedCurve::from_checked(chain, self.speed, self.transform);
            log::trace!(
                "curve {}: {} pixels, {:.3} time units",
                self.stats.curves,
                curve.len(),
                curve.total_time(),
            );
            return Some(curve);
        }

        self.exhausted = true;
        log::debug!(
            "tracer exhausted: {} component(s), {} curve(s), {} skipped",
            self.stats.components,
            self.stats.curves,
            self.stats.skipped,
        );
        None
    }
}

impl<T: PixelChainTracer> Iterator for MultiCurveSource<T> {
    type Item = TimeParameterizedCurve;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_curve()
    }
}

impl<T: PixelChainTracer> std::iter::FusedIterator for MultiCurveSource<T> {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tracer::{ChainListTracer, NextPoint};
    use crate::types::{PhysicalPoint, PixelChain, PixelPoint};

    fn line(len: i32) -> PixelChain {
        (0..len).map(|x| PixelPoint::new(x, 0)).collect()
    }

    fn config(min_curve_pixels: usize) -> PlotConfig {
        PlotConfig {
            speed: 1.0,
            scale: 1.0,
            origin: PhysicalPoint::new(0.0, 0.0),
            min_curve_pixels,
            ..PlotConfig::default()
        }
    }

    #[test]
    fn short_component_is_skipped_then_long_one_is_returned() {
        let tracer = ChainListTracer::new([line(3), line(7)]);
        let mut source = MultiCurveSource::new(tracer, &config(5)).unwrap();

        let curve = source.next_curve().unwrap();
        assert_eq!(curve.len(), 7);
        assert!(source.next_curve().is_none());

        let stats = source.stats();
        assert_eq!(stats.components, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.curves, 1);
        assert_eq!(stats.kept_pixels, 7);
        assert_eq!(stats.skipped_pixels, 3);
    }

    #[test]
    fn only_short_components_yields_nothing() {
        let tracer = ChainListTracer::new([line(3)]);
        let mut source = MultiCurveSource::new(tracer, &config(5)).unwrap();
        assert!(source.next_curve().is_none());
        assert!(source.is_exhausted());
    }

    #[test]
    fn no_curve_is_shorter_than_minimum() {
        let lengths = [1, 9, 2, 4, 4, 12, 3, 5, 1];
        let tracer = ChainListTracer::new(lengths.iter().map(|&n| line(n)));
        let source = MultiCurveSource::new(tracer, &config(4)).unwrap();
        let kept: Vec<usize> = source.map(|c| c.len()).collect();
        assert_eq!(kept, vec![9, 4, 4, 12, 5]);
    }

    #[test]
    fn minimum_of_one_keeps_single_pixels() {
        let tracer = ChainListTracer::new([line(1)]);
        let mut source = MultiCurveSource::new(tracer, &config(1)).unwrap();
        let mut curve = source.next_curve().unwrap();
        assert!(curve.total_time().abs() < f64::EPSILON);
        assert_eq!(curve.position_at(0.0), PhysicalPoint::new(0.0, 0.0));
    }

    #[test]
    fn curves_share_speed_and_transform() {
        let cfg = PlotConfig {
            speed: 2.0,
            scale: 0.5,
            origin: PhysicalPoint::new(10.0, 20.0),
            min_curve_pixels: 2,
            ..PlotConfig::default()
        };
        let tracer = ChainListTracer::new([line(5), line(3)]);
        let source = MultiCurveSource::new(tracer, &cfg).unwrap();
        let expected = *source.transform();
        for mut curve in source {
            assert_eq!(curve.transform(), &expected);
            let n = curve.len();
            // Pixel distance n-1 at speed 2.
            #[allow(clippy::cast_precision_loss)]
            let want = (n - 1) as f64 / 2.0;
            assert!((curve.total_time() - want).abs() < 1e-12);
            assert_eq!(curve.position_at(0.0), PhysicalPoint::new(10.0, 20.0));
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let tracer = ChainListTracer::new([line(3)]);
        let result = MultiCurveSource::new(tracer, &config(0));
        assert!(matches!(result, Err(PlotError::InvalidConfig(_))));
    }

    /// Tracer that counts how often it is asked for a new component.
    struct Counting {
        inner: ChainListTracer,
        begins: usize,
    }

    impl PixelChainTracer for Counting {
        fn begin_next_component(&mut self) -> bool {
            self.begins += 1;
            self.inner.begin_next_component()
        }

        fn next_point(&mut self) -> NextPoint {
            self.inner.next_point()
        }
    }

    #[test]
    fn exhausted_source_does_not_touch_tracer_again() {
        let tracer = Counting {
            inner: ChainListTracer::new([line(6)]),
            begins: 0,
        };
        let mut source = MultiCurveSource::new(tracer, &config(1)).unwrap();
        assert!(source.next_curve().is_some());
        assert!(source.next_curve().is_none());
        assert!(source.next_curve().is_none());
        assert!(source.next().is_none());
        assert_eq!(source.into_tracer().begins, 2);
    }

    #[test]
    fn from_bitmap_traces_ink() {
        let mut img = GrayImage::new(16, 4);
        for x in 2..12 {
            img.put_pixel(x, 1, image::Luma([255]));
        }
        img.put_pixel(14, 3, image::Luma([255]));

        let source = MultiCurveSource::from_bitmap(&img, &config(2)).unwrap();
        let curves: Vec<TimeParameterizedCurve> = source.collect();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].len(), 10);
        assert!((curves[0].total_time() - 9.0).abs() < 1e-12);
    }
}
