//! Tracked objects, the simulated clock, and the per-tick scene driver

pub mod clock;
pub mod selection;
pub mod synchronizer;
mod tracked;

pub use clock::{ClockMode, SimulatedClock};
pub use selection::{SelectionController, SelectionMode};
pub use synchronizer::{IngestSummary, SceneContext, SceneSynchronizer};
pub use tracked::*;
