//! Orbit trail generation

use glam::Vec3;

use super::frames::ReferenceFrame;
use super::propagator::{OrbitalRecord, Propagator};

const SAMPLE_STEP_SECONDS: f64 = 60.0;

/// One revolution sampled once per minute
#[derive(Debug, Clone, Default)]
pub struct OrbitSamples {
    pub points: Vec<Vec3>,
    /// Both the starting and the closing sample propagated
    pub complete: bool,
}

/// Sample one revolution starting at `from`, in render space.
///
/// Each sample is transformed with the sidereal angle of its own instant.
/// Samples that fail to propagate are skipped. The object's live position is
/// not touched.
pub fn sample_orbit(
    propagator: &dyn Propagator,
    record: &OrbitalRecord,
    from: &satkit::Instant,
    frame: ReferenceFrame,
) -> OrbitSamples {
    let Some(period_minutes) = record.period_minutes() else {
        return OrbitSamples::default();
    };

    let whole_minutes = period_minutes.floor() as usize;
    let mut offsets: Vec<f64> = (0..=whole_minutes)
        .map(|m| m as f64 * SAMPLE_STEP_SECONDS)
        .collect();
    let period_seconds = period_minutes * SAMPLE_STEP_SECONDS;
    if period_seconds - whole_minutes as f64 * SAMPLE_STEP_SECONDS > 1e-6 {
        offsets.push(period_seconds);
    }

    let mut points = Vec::with_capacity(offsets.len());
    let mut first_ok = false;
    let mut last_ok = false;

    for (i, offset) in offsets.iter().enumerate() {
        let at = *from + satkit::Duration::from_seconds(*offset);
        let ok = match propagator.propagate(record, &at) {
            Ok(state) => {
                let transform = frame.transform(propagator.sidereal_time(&at));
                points.push(transform.to_render(&state.position_km));
                true
            }
            Err(e) => {
                log::trace!("Skipping orbit sample at +{:.0}s: {}", offset, e);
                false
            }
        };
        if i == 0 {
            first_ok = ok;
        }
        last_ok = ok;
    }

    OrbitSamples {
        complete: first_ok && last_ok && points.len() >= 2,
        points,
    }
}
