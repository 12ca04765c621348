//! Timed-path text serializer.
//!
//! Writes every sample as one whitespace-separated line:
//!
//! ```text
//! <curve> <time> <x> <y>
//! ```
//!
//! `curve` is the zero-based curve index, `time` is measured from the
//! start of that curve, and `x`/`y` are physical coordinates. A motion
//! controller can replay the file by moving to `(x, y)` at `time`, lifting
//! the pen whenever the curve index changes.
//!
//! Lines beginning with `#` are metadata comments.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::fmt::Write;

use plotline_core::SampledCurve;

/// Metadata to embed as `#`-prefixed comment lines at the top of the
/// file. Each present field is emitted; multi-line values get one comment
/// line per line.
#[derive(Debug, Clone, Default)]
pub struct TimedMetadata<'a> {
    /// Source image filename — emitted as `# Source: <filename>`.
    pub title: Option<&'a str>,

    /// Free-form description — emitted as `# <line>`.
    pub description: Option<&'a str>,

    /// Serialized `PlotConfig` JSON — emitted as `# Config: <json>`.
    pub config_json: Option<&'a str>,
}

/// Serialize sampled curves into timed-path text.
///
/// Numbers are formatted to 5 decimal places.
///
/// # Examples
///
/// ```
/// use plotline_core::{PhysicalPoint, SampledCurve, TimedSample};
/// use plotline_export::timed::{TimedMetadata, to_timed_text};
///
/// let curve = SampledCurve {
///     samples: vec![
///         TimedSample { time: 0.0, position: PhysicalPoint::new(1.0, 2.0) },
///         TimedSample { time: 0.5, position: PhysicalPoint::new(1.5, 2.0) },
///     ],
///     total_time: 0.5,
/// };
/// let text = to_timed_text(&[curve], &TimedMetadata::default());
/// assert!(text.contains("0 0.50000 1.50000 2.00000"));
/// ```
#[must_use]
pub fn to_timed_text(curves: &[SampledCurve], metadata: &TimedMetadata<'_>) -> String {
    let mut out = String::new();

    // --- Metadata header ---
    let _ = writeln!(out, "# plotline");
    if let Some(title) = metadata.title {
        for line in title.lines() {
            let _ = writeln!(out, "# Source: {line}");
        }
    }
    if let Some(description) = metadata.description {
        for line in description.lines() {
            let _ = writeln!(out, "# {line}");
        }
    }
    if let Some(config_json) = metadata.config_json {
        for line in config_json.lines() {
            let _ = writeln!(out, "# Config: {line}");
        }
    }
    let total: f64 = curves.iter().map(|c| c.total_time).sum();
    let _ = writeln!(out, "# Curves: {}", curves.len());
    let _ = writeln!(out, "# Total time: {total:.5}");

    // --- Samples ---
    for (index, curve) in curves.iter().enumerate() {
        for sample in &curve.samples {
            let _ = writeln!(
                out,
                "{index} {:.5} {:.5} {:.5}",
                sample.time, sample.position.x, sample.position.y,
            );
        }
    }

    out
}
