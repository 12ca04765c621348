//! Chain building: drain one tracer component into a [`PixelChain`].
//!
//! Walking a component and deciding whether to keep it are separate
//! steps. This module only walks; the length filter lives in
//! [`source`](crate::source).

use crate::tracer::PixelChainTracer;
use crate::types::PixelChain;

/// Drain the tracer's current component into a chain.
///
/// Calls [`next_point`](PixelChainTracer::next_point) until it reports
/// the last pixel, keeping every pixel including that last one. The
/// caller must have opened a component with
/// [`begin_next_component`](PixelChainTracer::begin_next_component).
/// The result always has at least one pixel.
pub fn drain<T: PixelChainTracer + ?Sized>(tracer: &mut T) -> PixelChain {
    let mut chain = PixelChain::default();
    loop {
        let step = tracer.next_point();
        chain.push(step.point());
        if !step.has_more() {
            return chain;
        }
    }
}
