//! Orbital propagation module
//!
//! Wraps an SGP4 propagator (satkit) behind the [`Propagator`] trait and
//! derives everything the scene needs from its output: render-space
//! positions in either reference frame, display telemetry, and sampled
//! orbit trails.

mod frames;
mod orbit_track;
pub(crate) mod propagator;
mod telemetry;

pub use frames::*;
pub use orbit_track::*;
pub use propagator::*;
pub use telemetry::*;
