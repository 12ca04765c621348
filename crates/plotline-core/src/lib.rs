//! plotline-core: curve assembly and time parameterization (sans-IO).
//!
//! Turns the connected components of a monochrome bitmap into timed pen
//! paths for a constant-speed plotter:
//!
//! tracer -> chain builder -> length filter -> timed curve -> transform
//!
//! The engine is the [`MultiCurveSource`]: it drains a
//! [`PixelChainTracer`] one component at a time, drops components that
//! are too short, and hands out [`TimeParameterizedCurve`]s that answer
//! "where is the pen at time `t`" for non-decreasing `t`.
//!
//! This crate has **no I/O dependencies**. It decodes in-memory byte
//! slices and returns structured data; reading files and driving
//! hardware are left to callers.

pub mod binarize;
pub mod chain;
pub mod curve;
pub mod diagnostics;
pub mod sampler;
pub mod source;
pub mod tracer;
pub mod transform;
pub mod types;

pub use curve::{Curve, TimeParameterizedCurve};
pub use sampler::{SampledCurve, TimedSample, sample_curve};
pub use source::{MultiCurve, MultiCurveSource, SourceStats};
pub use tracer::{
    BitmapTracer, ChainListTracer, NextPoint, PixelChainTracer, PixelWalkTracer, TracerKind,
};
pub use transform::CoordinateTransform;
pub use types::{
    Dimensions, GrayImage, PhysicalPoint, PixelChain, PixelPoint, PlotConfig, PlotError,
    PlotResult,
};

/// Run the full image-to-timed-curves pipeline.
///
/// # Pipeline steps
///
/// 1. Decode image and convert to grayscale
/// 2. Threshold into ink and background
/// 3. Trace components and build a curve for each long-enough one
/// 4. Sample every curve every `step` time units
///
/// # Errors
///
/// Returns [`PlotError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PlotError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PlotError::InvalidConfig`] if `config` or `step` is invalid.
/// Returns [`PlotError::NoCurves`] if no component reaches
/// `min_curve_pixels`.
pub fn process(
    image_bytes: &[u8],
    config: &PlotConfig,
    step: f64,
) -> Result<PlotResult, PlotError> {
    let gray = binarize::decode_and_grayscale(image_bytes)?;
    let dimensions = Dimensions {
        width: gray.width(),
        height: gray.height(),
    };

    let binary = binarize::binarize(&gray, config.threshold, config.invert);
    let (curves, stats) = plot_bitmap(&binary, config, step)?;
    if curves.is_empty() {
        return Err(PlotError::NoCurves);
    }

    Ok(PlotResult {
        curves,
        dimensions,
        stats,
    })
}

/// Trace a binary bitmap and sample every resulting curve.
///
/// Non-zero pixels are ink. Unlike [`process`], an empty result is not an
/// error.
///
/// # Errors
///
/// Returns [`PlotError::InvalidConfig`] if `config` or `step` is invalid.
pub fn plot_bitmap(
    bitmap: &GrayImage,
    config: &PlotConfig,
    step: f64,
) -> Result<(Vec<SampledCurve>, SourceStats), PlotError> {
    let mut source = MultiCurveSource::from_bitmap(bitmap, config)?;
    let mut curves = Vec::new();
    while let Some(mut curve) = source.next_curve() {
        curves.push(sample_curve(&mut curve, step)?);
    }
    Ok((curves, source.stats()))
}
