//! Fixed-step sampling of a curve, the way a plotter drive loop reads it.
//!
//! The drive loop asks for the pen position at evenly spaced times and
//! moves the actuator there. [`sample_curve`] does the same and records
//! the answers, always finishing exactly at the curve's end so the last
//! pixel is never cut short.

use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::types::{PhysicalPoint, PlotError};

/// Pen position at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedSample {
    /// Time since the start of the curve.
    pub time: f64,
    /// Pen position in physical space.
    pub position: PhysicalPoint,
}

/// The samples taken from one curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledCurve {
    /// Samples in time order, first at `0`, last at `total_time`.
    pub samples: Vec<TimedSample>,
    /// Duration of the curve.
    pub total_time: f64,
}

impl SampledCurve {
    /// Number of samples.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if nothing was sampled.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate over the sampled positions.
    pub fn positions(&self) -> impl Iterator<Item = PhysicalPoint> + '_ {
        self.samples.iter().map(|s| s.position)
    }

    /// Length of the sampled polyline in physical units.
    #[must_use]
    pub fn path_length(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| w[0].position.distance(w[1].position))
            .sum()
    }
}

/// Most samples [`sample_curve`] takes from one curve.
pub const MAX_SAMPLES_PER_CURVE: u32 = 1_000_000;

/// Sample `curve` every `step` time units from `0` to its total time.
///
/// The last sample is always taken at exactly
/// [`total_time`](Curve::total_time), even when it does not fall on a
/// step boundary. A zero-length curve yields a single sample. The curve's
/// query cursor is consumed, so sample a curve only once.
///
/// # Errors
///
/// Returns [`PlotError::InvalidConfig`] if `step` is not a positive
/// finite number, or if it is so small that the curve would need more
/// than [`MAX_SAMPLES_PER_CURVE`] samples.
pub fn sample_curve<C: Curve + ?Sized>(
    curve: &mut C,
    step: f64,
) -> Result<SampledCurve, PlotError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(PlotError::InvalidConfig(format!(
            "sample step must be positive and finite, got {step}"
        )));
    }

    let total_time = curve.total_time();
    let steps = (total_time / step).ceil();
    if steps >= f64::from(MAX_SAMPLES_PER_CURVE) {
        return Err(PlotError::InvalidConfig(format!(
            "sample step {step} is too small for a curve of {total_time} time units \
             (limit is {MAX_SAMPLES_PER_CURVE} samples per curve)"
        )));
    }
    // In range: checked against the cap above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = steps as u32;

    let mut samples = Vec::with_capacity(steps as usize + 1);
    for k in 0..steps {
        // Multiply instead of accumulating so rounding does not drift.
        let time = f64::from(k) * step;
        if time >= total_time {
            break;
        }
        samples.push(TimedSample {
            time,
            position: curve.position_at(time),
        });
    }
    samples.push(TimedSample {
        time: total_time,
        position: curve.position_at(total_time),
    });

    Ok(SampledCurve {
        samples,
        total_time,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::curve::TimeParameterizedCurve;
    use crate::transform::CoordinateTransform;
    use crate::types::{PixelChain, PixelPoint};

    fn curve(points: &[(i32, i32)], speed: f64) -> TimeParameterizedCurve {
        let chain: PixelChain = points.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect();
        TimeParameterizedCurve::new(chain, speed, CoordinateTransform::default()).unwrap()
    }

    #[test]
    fn samples_on_step_boundaries_and_at_the_end() {
        let mut c = curve(&[(0, 0), (10, 0)], 4.0);
        let sampled = sample_curve(&mut c, 1.0).unwrap();
        let times: Vec<f64> = sampled.samples.iter().map(|s| s.time).collect();
        assert_eq!(times.len(), 4);
        for (got, want) in times.iter().zip([0.0, 1.0, 2.0, 2.5]) {
            assert!((got - want).abs() < 1e-12, "{times:?}");
        }
        let last = sampled.samples.last().unwrap();
        assert_eq!(last.position, PhysicalPoint::new(10.0, 0.0));
        assert!((sampled.samples[1].position.x - 4.0).abs() < 1e-12);
    }

    #[test]
    fn exact_multiple_does_not_duplicate_the_end() {
        let mut c = curve(&[(0, 0), (0, 6)], 1.0);
        let sampled = sample_curve(&mut c, 2.0).unwrap();
        assert_eq!(sampled.len(), 4);
        assert!((sampled.samples[3].time - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_length_curve_has_one_sample() {
        let mut c = curve(&[(5, 5)], 1.0);
        let sampled = sample_curve(&mut c, 0.1).unwrap();
        assert_eq!(sampled.len(), 1);
        assert_eq!(sampled.samples[0].position, PhysicalPoint::new(5.0, 5.0));
        assert!(sampled.path_length().abs() < f64::EPSILON);
    }

    #[test]
    fn path_length_matches_pixel_length_for_straight_runs() {
        let mut c = curve(&[(0, 0), (3, 0), (3, 4)], 2.0);
        let sampled = sample_curve(&mut c, 0.25).unwrap();
        assert!((sampled.path_length() - 7.0).abs() < 1e-9);
        assert!((sampled.total_time - 3.5).abs() < 1e-12);
        assert_eq!(sampled.positions().count(), sampled.len());
    }

    #[test]
    fn rejects_bad_step() {
        for step in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut c = curve(&[(0, 0), (1, 0)], 1.0);
            assert!(matches!(
                sample_curve(&mut c, step),
                Err(PlotError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn rejects_step_needing_too_many_samples() {
        let mut c = curve(&[(0, 0), (10, 0)], 1.0);
        let result = sample_curve(&mut c, 1e-9);
        assert!(matches!(result, Err(PlotError::InvalidConfig(_))));
        // The refused call did not touch the cursor.
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn step_just_under_the_limit_is_accepted() {
        let mut c = curve(&[(0, 0), (10, 0)], 1.0);
        let step = 10.0 / f64::from(MAX_SAMPLES_PER_CURVE / 2);
        let sampled = sample_curve(&mut c, step).unwrap();
        let expected = MAX_SAMPLES_PER_CURVE as usize / 2 + 1;
        assert!(sampled.len().abs_diff(expected) <= 1, "{}", sampled.len());
        assert!((sampled.samples.last().unwrap().time - 10.0).abs() < f64::EPSILON);
    }
}
