//! Tracked object state

use glam::Vec3;

use crate::data::TleEntry;
use crate::propagation::{OrbitalRecord, Propagator, ReferenceFrame};
use crate::renderer::{MarkerId, PolylineId};

/// Unique for the lifetime of a session; never reused across groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// A sampled revolution attached to a selected object
#[derive(Debug, Clone)]
pub struct OrbitTrail {
    pub polyline: PolylineId,
    pub points: Vec<Vec3>,
    pub frame: ReferenceFrame,
}

#[derive(Debug, Clone)]
pub struct TrackedObject {
    pub id: ObjectId,
    pub name: String,
    pub line1: String,
    pub line2: String,
    record: Option<OrbitalRecord>,
    parse_failed: bool,
    /// Last good render-space position
    pub position: Option<Vec3>,
    pub marker: Option<MarkerId>,
    pub trail: Option<OrbitTrail>,
    pub selected: bool,
}

impl TrackedObject {
    pub fn new(id: ObjectId, entry: TleEntry) -> Self {
        Self {
            id,
            name: entry.name,
            line1: entry.line1,
            line2: entry.line2,
            record: None,
            parse_failed: false,
            position: None,
            marker: None,
            trail: None,
            selected: false,
        }
    }

    /// Parse the element lines on first use. A failed parse is remembered
    /// and never retried.
    pub fn ensure_record(&mut self, propagator: &dyn Propagator) -> Option<&OrbitalRecord> {
        if self.record.is_none() && !self.parse_failed {
            match propagator.parse_elements(&self.line1, &self.line2) {
                Ok(record) => self.record = Some(record),
                Err(e) => {
                    log::warn!("Unusable elements for '{}': {}", self.name, e);
                    self.parse_failed = true;
                }
            }
        }
        self.record.as_ref()
    }

    pub fn record(&self) -> Option<&OrbitalRecord> {
        self.record.as_ref()
    }

    pub fn catalog_number(&self) -> Option<u32> {
        self.record.as_ref().and_then(|r| r.catalog_number)
    }

    /// Has elements and can be propagated
    pub fn is_schedulable(&self) -> bool {
        self.record.is_some()
    }
}
