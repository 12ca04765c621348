//! plotline-bench: CLI tool for running plotline on an image file.
//!
//! Traces the image with configurable parameters, samples every curve at
//! a fixed time step, and prints per-stage diagnostics. Useful for:
//!
//! - Choosing a threshold and minimum curve length for a drawing
//! - Comparing tracers (`pixel-walk` vs `border-following`)
//! - Estimating total plot time for a given pen speed
//! - Producing an SVG preview or a timed path file
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin plotline-bench -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Set `RUST_LOG=debug` to see which components were skipped.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use plotline_core::diagnostics::Clock;
use plotline_core::{PhysicalPoint, PlotConfig, TracerKind};

/// Trace an image into timed pen paths and report what came out.
#[derive(Parser)]
#[command(name = "plotline-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Pen speed in pixels per second.
    #[arg(long, default_value_t = PlotConfig::DEFAULT_SPEED)]
    speed: f64,

    /// Physical size of one pixel (e.g. mm).
    #[arg(long, default_value_t = PlotConfig::DEFAULT_SCALE)]
    scale: f64,

    /// Physical position of pixel (0, 0) as "X,Y".
    #[arg(long, value_name = "X,Y", default_value = "0,0")]
    origin: String,

    /// Drop components with fewer pixels than this.
    #[arg(long, default_value_t = PlotConfig::DEFAULT_MIN_CURVE_PIXELS, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    min_curve_pixels: usize,

    /// Luminance below which a pixel is ink.
    #[arg(long, default_value_t = PlotConfig::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Treat light pixels as ink.
    #[arg(long)]
    invert: bool,

    /// Component tracer.
    #[arg(long, value_enum, default_value_t = Tracer::PixelWalk)]
    tracer: Tracer,

    /// Sampling interval in seconds.
    #[arg(long, default_value_t = 0.05)]
    step: f64,

    /// Full plot config as a JSON string.
    ///
    /// When provided, all other config flags are ignored. Missing fields
    /// take their default values.
    #[arg(long)]
    config_json: Option<String>,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Write an SVG preview to this file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the timed path listing to this file.
    #[arg(long)]
    timed: Option<PathBuf>,
}

/// Component tracer selection.
#[derive(Clone, Copy, ValueEnum)]
enum Tracer {
    /// 8-connected walk over ink pixels.
    PixelWalk,
    /// Outline of each filled region.
    BorderFollowing,
}

/// Parse `--origin "X,Y"`.
fn parse_origin(origin: &str) -> Result<PhysicalPoint, String> {
    let (x_str, y_str) = origin
        .split_once(',')
        .ok_or_else(|| format!("origin must be 'X,Y', got: '{origin}'"))?;
    let x: f64 = x_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid origin X '{x_str}': {e}"))?;
    let y: f64 = y_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid origin Y '{y_str}': {e}"))?;
    Ok(PhysicalPoint::new(x, y))
}

/// Build a [`PlotConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PlotConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PlotConfig {
        speed: cli.speed,
        origin: parse_origin(&cli.origin)?,
        scale: cli.scale,
        min_curve_pixels: cli.min_curve_pixels,
        threshold: cli.threshold,
        invert: cli.invert,
        tracer: match cli.tracer {
            Tracer::PixelWalk => TracerKind::PixelWalk,
            Tracer::BorderFollowing => TracerKind::BorderFollowing,
        },
    })
}

fn main() -> ExitCode {
    // RUST_LOG, when set, overrides the info default.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli).and_then(|c| {
        c.validate().map_err(|e| e.to_string())?;
        Ok(c)
    }) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "Image: {} ({} bytes)",
        cli.image_path.display(),
        image_bytes.len(),
    );
    log::info!("Config: {config:?}");

    let (result, diagnostics) = match plotline_core::diagnostics::process_with_diagnostics(
        &image_bytes,
        &config,
        cli.step,
        &StdClock,
    ) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("Plot error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing diagnostics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", diagnostics.report());
    }

    let title = cli
        .image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("plot");
    let description = format!("{config:#?}");
    let config_json = serde_json::to_string(&config).ok();

    if let Some(ref svg_path) = cli.svg {
        let metadata = plotline_export::SvgMetadata {
            title: Some(title),
            description: Some(&description),
            config_json: config_json.as_deref(),
        };
        let svg = plotline_export::to_svg(&result.curves, &metadata);
        if let Err(e) = std::fs::write(svg_path, &svg) {
            eprintln!("Error writing SVG to {}: {e}", svg_path.display());
            return ExitCode::FAILURE;
        }
        log::info!("SVG written to {} ({} bytes)", svg_path.display(), svg.len());
    }

    if let Some(ref timed_path) = cli.timed {
        let metadata = plotline_export::TimedMetadata {
            title: cli.image_path.file_name().and_then(|s| s.to_str()),
            description: None,
            config_json: config_json.as_deref(),
        };
        let text = plotline_export::to_timed_text(&result.curves, &metadata);
        if let Err(e) = std::fs::write(timed_path, &text) {
            eprintln!("Error writing timed path to {}: {e}", timed_path.display());
            return ExitCode::FAILURE;
        }
        log::info!(
            "Timed path written to {} ({} bytes)",
            timed_path.display(),
            text.len(),
        );
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn origin_parses_pair() {
        let p = parse_origin(" 12.5 , -3 ").unwrap();
        assert_eq!(p, PhysicalPoint::new(12.5, -3.0));
    }

    #[test]
    fn origin_rejects_garbage() {
        assert!(parse_origin("12").is_err());
        assert!(parse_origin("a,1").is_err());
        assert!(parse_origin("1,b").is_err());
    }

    #[test]
    fn flags_build_config() {
        let cli = Cli::parse_from([
            "plotline-bench",
            "img.png",
            "--speed",
            "10",
            "--origin",
            "5,6",
            "--tracer",
            "border-following",
            "--invert",
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert!((config.speed - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.origin, PhysicalPoint::new(5.0, 6.0));
        assert_eq!(config.tracer, TracerKind::BorderFollowing);
        assert!(config.invert);
        assert_eq!(config.min_curve_pixels, PlotConfig::DEFAULT_MIN_CURVE_PIXELS);
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = Cli::parse_from([
            "plotline-bench",
            "img.png",
            "--speed",
            "10",
            "--config-json",
            r#"{"speed": 3.0, "min_curve_pixels": 9}"#,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert!((config.speed - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.min_curve_pixels, 9);
    }

    #[test]
    fn min_curve_pixels_must_be_positive() {
        let result = Cli::try_parse_from(["plotline-bench", "img.png", "--min-curve-pixels", "0"]);
        assert!(result.is_err());
    }
}
