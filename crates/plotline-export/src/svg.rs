//! SVG preview serializer.
//!
//! Converts sampled curves into an SVG string with one `<path>` element
//! per curve, using the [`svg`] crate for document construction, XML
//! escaping, and path data formatting.
//!
//! Coordinates are written in physical units (millimetres) exactly as
//! the plotter would receive them. The `viewBox` is the bounding box of
//! all samples grown by [`MARGIN_MM`] on each side, and the document
//! `width`/`height` carry `mm` units so the preview prints at true size.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Path, Title};
use svg::node::{Node, Text, Value};

use plotline_core::{PhysicalPoint, SampledCurve};

/// Blank border around the drawing, in millimetres.
pub const MARGIN_MM: f64 = 5.0;

/// Stroke width used for every path, in millimetres.
pub const PEN_WIDTH_MM: f64 = 0.3;

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically by
/// the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title — emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description — emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized `PlotConfig` JSON — emitted inside a `<metadata>`
    /// element wrapped in a namespaced `<plotline:config>` element.
    pub config_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from a sampled curve.
///
/// Uses `M` for the first sample and `L` for the rest. A single-sample
/// curve becomes a zero-length segment so round caps still draw a dot.
/// Returns an empty string for a curve with no samples.
///
/// # Examples
///
/// ```
/// use plotline_core::{PhysicalPoint, SampledCurve, TimedSample};
/// use plotline_export::build_path_data;
///
/// let curve = SampledCurve {
///     samples: vec![
///         TimedSample { time: 0.0, position: PhysicalPoint::new(10.0, 20.0) },
///         TimedSample { time: 1.0, position: PhysicalPoint::new(30.0, 40.0) },
///     ],
///     total_time: 1.0,
/// };
/// assert_eq!(build_path_data(&curve), "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(curve: &SampledCurve) -> String {
    let mut positions = curve.positions();
    let Some(first) = positions.next() else {
        return String::new();
    };

    let mut data = Data::new().move_to((first.x, first.y));
    let mut drew = false;
    for p in positions {
        data = data.line_to((p.x, p.y));
        drew = true;
    }
    if !drew {
        data = data.line_to((first.x, first.y));
    }
    String::from(Value::from(data))
}

/// Axis-aligned bounds of every sample, or `None` if there are none.
fn bounds(curves: &[SampledCurve]) -> Option<(PhysicalPoint, PhysicalPoint)> {
    curves
        .iter()
        .flat_map(SampledCurve::positions)
        .fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((
                PhysicalPoint::new(lo.x.min(p.x), lo.y.min(p.y)),
                PhysicalPoint::new(hi.x.max(p.x), hi.y.max(p.y)),
            )),
        })
}

/// Serialize sampled curves into an SVG document string.
///
/// # Examples
///
/// ```
/// use plotline_core::{PhysicalPoint, SampledCurve, TimedSample};
/// use plotline_export::{SvgMetadata, to_svg};
///
/// let curve = SampledCurve {
///     samples: vec![
///         TimedSample { time: 0.0, position: PhysicalPoint::new(10.0, 15.0) },
///         TimedSample { time: 0.5, position: PhysicalPoint::new(12.5, 18.5) },
///     ],
///     total_time: 0.5,
/// };
/// let metadata = SvgMetadata {
///     title: Some("lines"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&[curve], &metadata);
/// assert!(svg.contains("<title>lines</title>"));
/// assert!(svg.contains("M10,15 L12.5,18.5"));
/// ```
#[must_use]
pub fn to_svg(curves: &[SampledCurve], metadata: &SvgMetadata<'_>) -> String {
    let (lo, hi) = bounds(curves).unwrap_or((
        PhysicalPoint::new(0.0, 0.0),
        PhysicalPoint::new(0.0, 0.0),
    ));
    let min_x = lo.x - MARGIN_MM;
    let min_y = lo.y - MARGIN_MM;
    let width = 2.0f64.mul_add(MARGIN_MM, hi.x - lo.x);
    let height = 2.0f64.mul_add(MARGIN_MM, hi.y - lo.y);

    let mut doc = Document::new()
        .set("width", format!("{width}mm"))
        .set("height", format!("{height}mm"))
        .set("viewBox", format!("{min_x} {min_y} {width} {height}"));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("plotline:config");
        config_el.assign("xmlns:plotline", "https://plotline.dev/ns/1");
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    for curve in curves {
        let d = build_path_data(curve);
        if d.is_empty() {
            continue;
        }

        let path = Path::new()
            .set("d", d)
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", PEN_WIDTH_MM)
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round");
        doc = doc.add(path);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
