//! Render-space positions and human-readable telemetry for tracked objects

use glam::Vec3;
use nalgebra::Vector3;

use super::frames::FrameTransform;
use super::propagator::{OrbitalRecord, Propagator, StateVector, EARTH_RADIUS_KM, MU_EARTH};
use crate::scene::TrackedObject;

// WGS-84 semi-axes for the geodetic conversion
const ELLIPSOID_A_KM: f64 = 6378.137;
const ELLIPSOID_B_KM: f64 = 6356.7523142;
const GEODETIC_ITERATIONS: usize = 20;

/// Render-space position of `object` at `at` in the frame bound by `transform`.
///
/// Returns `None` when the object has no usable elements or propagation
/// fails. Failures are logged here and never propagated further.
pub fn position_at(
    propagator: &dyn Propagator,
    object: &mut TrackedObject,
    at: &satkit::Instant,
    transform: &FrameTransform,
) -> Option<Vec3> {
    object.ensure_record(propagator)?;
    let record = object.record()?;
    match propagator.propagate(record, at) {
        Ok(state) => Some(transform.to_render(&state.position_km)),
        Err(e) => {
            log::debug!("Propagation failed for '{}': {}", object.name, e);
            None
        }
    }
}

/// Display values for one object at one instant, rounded to 2 decimals
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub name: String,
    pub catalog_number: Option<u32>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    pub speed_km_s: f64,
    pub semi_major_axis_km: f64,
    pub apogee_km: f64,
    pub perigee_km: f64,
    pub inclination_deg: f64,
}

impl Telemetry {
    pub fn latitude(&self) -> String {
        format_latitude(self.latitude_deg)
    }

    pub fn longitude(&self) -> String {
        format_longitude(self.longitude_deg)
    }
}

impl std::fmt::Display for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.catalog_number {
            Some(n) => write!(f, "{} [{}]", self.name, n)?,
            None => write!(f, "{}", self.name)?,
        }
        write!(
            f,
            ": {}, {}, alt {} km, {} km/s, apogee {} km, perigee {} km, incl {}°",
            self.latitude(),
            self.longitude(),
            self.altitude_km,
            self.speed_km_s,
            self.apogee_km,
            self.perigee_km,
            self.inclination_deg
        )
    }
}

/// Propagate `object` at `at` and derive its telemetry
pub fn telemetry(
    propagator: &dyn Propagator,
    object: &mut TrackedObject,
    at: &satkit::Instant,
) -> Option<Telemetry> {
    let gmst = propagator.sidereal_time(at);
    object.ensure_record(propagator)?;
    let record = object.record()?;
    let state = match propagator.propagate(record, at) {
        Ok(state) => state,
        Err(e) => {
            log::debug!("No telemetry for '{}': {}", object.name, e);
            return None;
        }
    };
    Some(derive_telemetry(&object.name, record, &state, gmst))
}

/// Pure derivation from a propagated state
pub fn derive_telemetry(
    name: &str,
    record: &OrbitalRecord,
    state: &StateVector,
    gmst: f64,
) -> Telemetry {
    let geo = eci_to_geodetic(&state.position_km, gmst);
    let a_m = semi_major_axis_m(record.mean_motion_rad_s());
    let (apogee_km, perigee_km) = apsides_km(a_m, record.eccentricity);

    Telemetry {
        name: name.to_string(),
        catalog_number: record.catalog_number,
        latitude_deg: round2(geo.latitude.to_degrees()),
        longitude_deg: round2(geo.longitude.to_degrees()),
        altitude_km: round2(geo.height_km),
        speed_km_s: round2(state.velocity_km_s.norm()),
        semi_major_axis_km: round2(a_m / 1000.0),
        apogee_km: round2(apogee_km),
        perigee_km: round2(perigee_km),
        inclination_deg: round2(record.inclination_deg),
    }
}

/// Geodetic coordinates, radians and kilometers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude: f64,
    pub longitude: f64,
    pub height_km: f64,
}

pub fn eci_to_geodetic(eci_km: &Vector3<f64>, gmst: f64) -> Geodetic {
    let a = ELLIPSOID_A_KM;
    let f = (ELLIPSOID_A_KM - ELLIPSOID_B_KM) / ELLIPSOID_A_KM;
    let e2 = 2.0 * f - f * f;

    let r = (eci_km.x * eci_km.x + eci_km.y * eci_km.y).sqrt();
    let longitude = wrap_pi(eci_km.y.atan2(eci_km.x) - gmst);

    let mut latitude = eci_km.z.atan2(r);
    let mut c = 1.0;
    for _ in 0..GEODETIC_ITERATIONS {
        let sin_lat = latitude.sin();
        c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        latitude = (eci_km.z + a * c * e2 * sin_lat).atan2(r);
    }
    let height_km = r / latitude.cos() - a * c;

    Geodetic {
        latitude,
        longitude,
        height_km,
    }
}

/// a = μ^(1/3) / n^(2/3), meters, with n in rad/s
pub fn semi_major_axis_m(mean_motion_rad_s: f64) -> f64 {
    MU_EARTH.cbrt() / mean_motion_rad_s.powf(2.0 / 3.0)
}

/// (apogee, perigee) altitudes in km for a semi-major axis in meters
pub fn apsides_km(semi_major_axis_m: f64, eccentricity: f64) -> (f64, f64) {
    let apogee = semi_major_axis_m * (1.0 + eccentricity) / 1000.0 - EARTH_RADIUS_KM;
    let perigee = semi_major_axis_m * (1.0 - eccentricity) / 1000.0 - EARTH_RADIUS_KM;
    (apogee, perigee)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn format_latitude(deg: f64) -> String {
    if deg < 0.0 {
        format!("{}° S", round2(-deg))
    } else {
        format!("{}° N", round2(deg))
    }
}

pub fn format_longitude(deg: f64) -> String {
    if deg < 0.0 {
        format!("{}° W", round2(-deg))
    } else {
        format!("{}° E", round2(deg))
    }
}

fn wrap_pi(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}
