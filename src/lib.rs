//! Orbital telemetry and scene synchronization for TLE catalogs
//!
//! Catalog text flows through the cache and the TLE parser into tracked
//! objects; the scene synchronizer moves their markers on every clock tick in
//! the active reference frame; selection attaches one-revolution trails.

pub mod config;
pub mod data;
pub mod error;
pub mod propagation;
pub mod renderer;
pub mod scene;
pub mod session;

pub use session::{Session, SessionEvent};
