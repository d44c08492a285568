//! Marker appearance and GPU-ready instance data

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Visual state of one object marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub color: [f32; 4],
    /// Radius in render units (Earth radii)
    pub size: f32,
}

impl MarkerStyle {
    /// Unselected objects
    pub const DEFAULT: MarkerStyle = MarkerStyle {
        color: [1.0, 1.0, 1.0, 1.0],
        size: 0.01,
    };

    /// Selected objects: larger, yellow
    pub const HIGHLIGHT: MarkerStyle = MarkerStyle {
        color: [1.0, 1.0, 0.0, 1.0],
        size: 0.03,
    };
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Orbit trail line colour
pub const TRAIL_COLOR: [f32; 4] = [0.3, 0.8, 1.0, 0.8];

/// Instance data for each marker point
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MarkerInstance {
    /// Position in world space (Earth radii)
    pub position: [f32; 3],
    /// RGBA
    pub color: [f32; 4],
    /// Size multiplier
    pub size: f32,
}

impl MarkerInstance {
    pub fn new(position: Vec3, style: MarkerStyle) -> Self {
        Self {
            position: position.to_array(),
            color: style.color,
            size: style.size,
        }
    }
}

/// Orbit trail line data
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TrailVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

pub fn trail_vertices(points: &[Vec3], color: [f32; 4]) -> Vec<TrailVertex> {
    points
        .iter()
        .map(|p| TrailVertex {
            position: p.to_array(),
            color,
        })
        .collect()
}
