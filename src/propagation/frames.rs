//! Reference frames and the physics → render axis convention

use glam::Vec3;
use nalgebra::{Rotation3, Vector3};

use super::propagator::EARTH_RADIUS_KM;

/// Scene-wide coordinate convention for object positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum ReferenceFrame {
    /// Rotates with the planet (ECEF)
    #[default]
    EarthFixed,
    /// Fixed relative to distant stars (ECI)
    Inertial,
}

impl ReferenceFrame {
    pub fn toggled(self) -> Self {
        match self {
            ReferenceFrame::EarthFixed => ReferenceFrame::Inertial,
            ReferenceFrame::Inertial => ReferenceFrame::EarthFixed,
        }
    }

    /// Resolve the frame against one instant. Build once per update pass.
    pub fn transform(self, gmst: f64) -> FrameTransform {
        match self {
            ReferenceFrame::EarthFixed => FrameTransform::EarthFixed { gmst },
            ReferenceFrame::Inertial => FrameTransform::Inertial,
        }
    }
}

/// A frame bound to a specific sidereal angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameTransform {
    EarthFixed { gmst: f64 },
    Inertial,
}

impl FrameTransform {
    pub fn frame(&self) -> ReferenceFrame {
        match self {
            FrameTransform::EarthFixed { .. } => ReferenceFrame::EarthFixed,
            FrameTransform::Inertial => ReferenceFrame::Inertial,
        }
    }

    /// Map an ECI position (km) into this frame (km, physics axes)
    pub fn apply(&self, eci_km: &Vector3<f64>) -> Vector3<f64> {
        match self {
            FrameTransform::EarthFixed { gmst } => eci_to_ecef(eci_km, *gmst),
            FrameTransform::Inertial => *eci_km,
        }
    }

    /// ECI position (km) → render space (Earth radii, Y-up)
    pub fn to_render(&self, eci_km: &Vector3<f64>) -> Vec3 {
        physics_to_render(&self.apply(eci_km))
    }
}

/// Rotate about the polar axis by -gmst
pub fn eci_to_ecef(eci_km: &Vector3<f64>, gmst: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), -gmst) * eci_km
}

/// Physics frames are Z-up; the renderer is Y-up.
/// Physics X -> Render X, physics Z -> Render Y, physics Y -> Render -Z.
pub fn physics_to_render(km: &Vector3<f64>) -> Vec3 {
    let er = km / EARTH_RADIUS_KM;
    Vec3::new(er.x as f32, er.z as f32, -er.y as f32)
}

/// Inverse of [`physics_to_render`], back to kilometers
pub fn render_to_physics(render: Vec3) -> Vector3<f64> {
    Vector3::new(render.x as f64, -render.z as f64, render.y as f64) * EARTH_RADIUS_KM
}
