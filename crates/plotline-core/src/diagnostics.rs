//! Run diagnostics: timing and counts for each stage of [`process`](crate::process).
//!
//! Time is read through the [`Clock`] trait so this crate stays free of
//! platform time APIs; the CLI passes a clock backed by
//! `std::time::Instant`.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::binarize;
use crate::types::{Dimensions, PlotConfig, PlotError, PlotResult};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDiagnostics {
    /// Stage 1: image decoding and grayscale conversion.
    pub decode: StageDiagnostics,
    /// Stage 2: ink thresholding.
    pub binarize: StageDiagnostics,
    /// Stage 3: tracing, curve building and sampling.
    pub trace: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: RunSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
    },
    /// Thresholding metrics.
    Binarize {
        /// Luminance threshold used.
        threshold: u8,
        /// Whether light pixels were treated as ink.
        invert: bool,
        /// Number of ink pixels.
        ink_pixel_count: u64,
        /// Total pixel count, for ink density.
        total_pixel_count: u64,
    },
    /// Tracing and sampling metrics.
    Trace {
        /// Which tracer was used.
        tracer: String,
        /// Components drained from the tracer.
        components: usize,
        /// Components kept as curves.
        curves: usize,
        /// Components dropped as too short.
        skipped: usize,
        /// Pixels across kept curves.
        kept_pixels: usize,
        /// Samples emitted across all curves.
        samples: usize,
    },
}

/// High-level summary of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Number of curves produced.
    pub curve_count: usize,
    /// Total drawing time across all curves.
    pub total_plot_time: f64,
    /// Total pen travel while drawing, in physical units.
    pub total_path_length: f64,
}

impl RunDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Plot Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{}",
            self.summary.image_width, self.summary.image_height,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Binarize", &self.binarize),
            ("Trace", &self.trace),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Curves: {}  |  Plot time: {:.3}  |  Path length: {:.3}",
            self.summary.curve_count, self.summary.total_plot_time, self.summary.total_path_length,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Binarize {
            threshold,
            invert,
            ink_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *ink_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            let mode = if *invert { " inverted" } else { "" };
            format!("threshold={threshold}{mode} ink={ink_pixel_count} ({density:.1}%)")
        }
        StageMetrics::Trace {
            tracer,
            components,
            curves,
            skipped,
            kept_pixels,
            samples,
        } => format!(
            "{tracer} {components} components -> {curves} curves ({skipped} skipped), {kept_pixels} px, {samples} samples",
        ),
    }
}

/// Run [`process`](crate::process) while timing each stage.
///
/// # Errors
///
/// Same as [`process`](crate::process).
pub fn process_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PlotConfig,
    step: f64,
    clock: &C,
) -> Result<(PlotResult, RunDiagnostics), PlotError> {
    let run_start = clock.now();

    let start = clock.now();
    let gray = binarize::decode_and_grayscale(image_bytes)?;
    let dimensions = Dimensions {
        width: gray.width(),
        height: gray.height(),
    };
    let decode = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: dimensions.width,
            height: dimensions.height,
        },
    };

    let start = clock.now();
    let binary = binarize::binarize(&gray, config.threshold, config.invert);
    let binarize_stage = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Binarize {
            threshold: config.threshold,
            invert: config.invert,
            ink_pixel_count: binarize::count_ink(&binary),
            total_pixel_count: u64::from(dimensions.width) * u64::from(dimensions.height),
        },
    };

    let start = clock.now();
    let (curves, stats) = crate::plot_bitmap(&binary, config, step)?;
    let trace = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Trace {
            tracer: format!("{:?}", config.tracer),
            components: stats.components,
            curves: stats.curves,
            skipped: stats.skipped,
            kept_pixels: stats.kept_pixels,
            samples: curves.iter().map(crate::SampledCurve::len).sum(),
        },
    };

    if curves.is_empty() {
        return Err(PlotError::NoCurves);
    }

    let result = PlotResult {
        curves,
        dimensions,
        stats,
    };
    let summary = RunSummary {
        image_width: dimensions.width,
        image_height: dimensions.height,
        curve_count: result.curves.len(),
        total_plot_time: result.total_time(),
        total_path_length: result.curves.iter().map(crate::SampledCurve::path_length).sum(),
    };
    let diagnostics = RunDiagnostics {
        decode,
        binarize: binarize_stage,
        trace,
        total_duration: clock.elapsed(&run_start),
        summary,
    };
    Ok((result, diagnostics))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Clock that advances one millisecond per reading.
    struct TickClock {
        ticks: Cell<u64>,
    }

    impl Clock for TickClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.now() - since)
        }
    }

    fn line_png() -> Vec<u8> {
        let img = image::RgbaImage::from_fn(30, 10, |x, y| {
            if y == 4 && (3..25).contains(&x) {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let ms = duration_ms(Duration::from_millis(1234));
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn diagnostics_count_the_line() {
        let clock = TickClock {
            ticks: Cell::new(0),
        };
        let config = PlotConfig {
            speed: 1.0,
            scale: 1.0,
            ..PlotConfig::default()
        };
        let (result, diag) = process_with_diagnostics(&line_png(), &config, 1.0, &clock).unwrap();

        assert_eq!(result.curves.len(), 1);
        assert_eq!(diag.summary.curve_count, 1);
        assert!((diag.summary.total_plot_time - 21.0).abs() < 1e-9);
        assert!((diag.summary.total_path_length - 21.0).abs() < 1e-9);
        assert!(matches!(
            diag.binarize.metrics,
            StageMetrics::Binarize {
                ink_pixel_count: 22,
                total_pixel_count: 300,
                ..
            }
        ));
        assert!(diag.total_duration >= diag.trace.duration);

        let report = diag.report();
        assert!(report.contains("Plot Diagnostics Report"));
        assert!(report.contains("PixelWalk"));
    }

    #[test]
    fn diagnostics_serde_round_trip() {
        let clock = TickClock {
            ticks: Cell::new(0),
        };
        let (_, diag) =
            process_with_diagnostics(&line_png(), &PlotConfig::default(), 0.5, &clock).unwrap();
        let json = serde_json::to_string(&diag).unwrap();
        let back: RunDiagnostics = serde_json::from_str(&json).unwrap();
        let drift = back.total_duration.as_secs_f64() - diag.total_duration.as_secs_f64();
        assert!(drift.abs() < 1e-6);
        assert_eq!(back.summary.curve_count, diag.summary.curve_count);
    }

    #[test]
    fn no_ink_is_no_curves() {
        let clock = TickClock {
            ticks: Cell::new(0),
        };
        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        let result = process_with_diagnostics(&buf, &PlotConfig::default(), 1.0, &clock);
        assert!(matches!(result, Err(PlotError::NoCurves)));
    }
}
