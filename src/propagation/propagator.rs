//! SGP4 propagation using satkit

use nalgebra::Vector3;
use satkit::sgp4::sgp4;

use crate::error::PropagationError;

/// Earth radius used by SGP4 (WGS-72), in kilometers
pub const EARTH_RADIUS_KM: f64 = 6378.135;

/// Earth's gravitational parameter (GM) in m³/s²
pub const MU_EARTH: f64 = 3.986004418e14;

pub const MINUTES_PER_DAY: f64 = 1440.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parsed element set, ready for propagation
#[derive(Debug, Clone)]
pub struct OrbitalRecord {
    pub catalog_number: Option<u32>,
    pub epoch: satkit::Instant,
    /// Revolutions per day
    pub mean_motion: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    elements: satkit::TLE,
}

impl OrbitalRecord {
    pub fn from_tle(tle: satkit::TLE) -> Self {
        Self {
            catalog_number: u32::try_from(tle.sat_num).ok().filter(|n| *n > 0),
            epoch: tle.epoch,
            mean_motion: tle.mean_motion,
            eccentricity: tle.eccen,
            inclination_deg: tle.inclination,
            elements: tle,
        }
    }

    /// Mean motion in rad/s
    pub fn mean_motion_rad_s(&self) -> f64 {
        self.mean_motion * 2.0 * std::f64::consts::PI / SECONDS_PER_DAY
    }

    /// Orbital period in minutes
    pub fn period_minutes(&self) -> Option<f64> {
        if self.mean_motion.is_finite() && self.mean_motion > 0.0 {
            Some(MINUTES_PER_DAY / self.mean_motion)
        } else {
            None
        }
    }
}

/// ECI state in kilometers and km/s, physics axes (Z toward the pole)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position_km: Vector3<f64>,
    pub velocity_km_s: Vector3<f64>,
}

impl StateVector {
    pub fn is_finite(&self) -> bool {
        self.position_km.iter().all(|c| c.is_finite())
            && self.velocity_km_s.iter().all(|c| c.is_finite())
    }
}

/// The numerical propagator the rest of the system is built around
pub trait Propagator: Send + Sync {
    fn parse_elements(&self, line1: &str, line2: &str) -> Result<OrbitalRecord, PropagationError>;

    fn propagate(
        &self,
        record: &OrbitalRecord,
        at: &satkit::Instant,
    ) -> Result<StateVector, PropagationError>;

    /// Greenwich mean sidereal time in radians
    fn sidereal_time(&self, at: &satkit::Instant) -> f64;
}

/// SGP4/SDP4 via satkit
#[derive(Debug, Default, Clone, Copy)]
pub struct SatkitPropagator;

impl Propagator for SatkitPropagator {
    fn parse_elements(&self, line1: &str, line2: &str) -> Result<OrbitalRecord, PropagationError> {
        match satkit::TLE::load_2line(line1, line2) {
            Ok(tle) => Ok(OrbitalRecord::from_tle(tle)),
            Err(e) => {
                log::trace!("Failed to parse TLE: {}", e);
                Err(PropagationError::InvalidElements {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn propagate(
        &self,
        record: &OrbitalRecord,
        at: &satkit::Instant,
    ) -> Result<StateVector, PropagationError> {
        // sgp4 mutates its TLE on first use
        let mut tle = record.elements.clone();
        let result = sgp4(&mut tle, &[*at]).map_err(|e| PropagationError::Propagator {
            reason: e.to_string(),
        })?;

        // pos and vel are in TEME, meters and m/s
        let pos = result.pos.column(0);
        let vel = result.vel.column(0);
        let state = StateVector {
            position_km: Vector3::new(pos[0], pos[1], pos[2]) / 1000.0,
            velocity_km_s: Vector3::new(vel[0], vel[1], vel[2]) / 1000.0,
        };

        if state.is_finite() {
            Ok(state)
        } else {
            Err(PropagationError::NonFinite)
        }
    }

    fn sidereal_time(&self, at: &satkit::Instant) -> f64 {
        satkit::frametransform::gmst(at)
    }
}
