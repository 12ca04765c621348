//! plotline-export: Pure format serializers (sans-IO)
//!
//! Converts sampled curves into output formats: an SVG preview at
//! physical size and a plain-text timed path for motion controllers.

pub mod svg;
pub mod timed;

pub use svg::{SvgMetadata, build_path_data, to_svg};
pub use timed::{TimedMetadata, to_timed_text};
