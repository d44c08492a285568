//! Rendering capability
//!
//! The scene synchronizer drives markers, trail polylines and the planet
//! through the [`Renderer`] trait. [`HeadlessScene`] is the in-memory scene
//! graph used by the driver binary and by tests; it also produces the
//! instance buffers a GPU backend uploads.

mod camera;
mod satellites;
mod scene;

pub use camera::*;
pub use satellites::*;
pub use scene::*;

use glam::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolylineId(pub u64);

/// Scene-graph operations the core needs from a 3D library
pub trait Renderer {
    fn create_marker(&mut self, position: Vec3, style: MarkerStyle) -> MarkerId;

    fn set_marker_position(&mut self, marker: MarkerId, position: Vec3);

    fn set_marker_style(&mut self, marker: MarkerId, style: MarkerStyle);

    fn remove_marker(&mut self, marker: MarkerId);

    fn create_polyline(&mut self, points: &[Vec3], color: [f32; 4]) -> PolylineId;

    fn remove_polyline(&mut self, polyline: PolylineId);

    /// Planet rotation about its own axis, radians
    fn set_planet_rotation(&mut self, angle: f64);

    /// Markers hit by a ray through `ndc`, nearest first
    fn cast_ray(&self, ndc: Vec2) -> Vec<MarkerId>;

    fn render(&mut self);

    /// Release every marker and polyline still alive
    fn dispose(&mut self);
}
