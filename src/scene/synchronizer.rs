//! Per-tick scene driver and reference frame management

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;

use super::tracked::{ObjectId, OrbitTrail, TrackedObject};
use crate::data::TleEntry;
use crate::propagation::{self, position_at, sample_orbit, Propagator, ReferenceFrame, Telemetry};
use crate::renderer::{MarkerId, MarkerStyle, Renderer, Viewport, TRAIL_COLOR};

/// Planet spin per tick while the inertial frame is active, degrees
pub const INERTIAL_SPIN_DEG_PER_TICK: f64 = 0.005;

/// Owns the renderer for the lifetime of a scene. Dropping it releases every
/// marker and polyline together.
pub struct SceneContext<R: Renderer> {
    renderer: R,
    pub viewport: Viewport,
}

impl<R: Renderer> SceneContext<R> {
    pub fn new(renderer: R, viewport: Viewport) -> Self {
        Self { renderer, viewport }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<R: Renderer> Drop for SceneContext<R> {
    fn drop(&mut self) {
        self.renderer.dispose();
    }
}

/// Counts from one ingest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestSummary {
    pub objects: usize,
    pub unusable: usize,
}

pub struct SceneSynchronizer<R: Renderer> {
    propagator: Arc<dyn Propagator>,
    context: SceneContext<R>,
    objects: Vec<TrackedObject>,
    by_marker: HashMap<MarkerId, ObjectId>,
    frame: ReferenceFrame,
    planet_rotation: f64,
    last_instant: Option<satkit::Instant>,
    next_object_id: u64,
}

impl<R: Renderer> SceneSynchronizer<R> {
    pub fn new(
        propagator: Arc<dyn Propagator>,
        context: SceneContext<R>,
        frame: ReferenceFrame,
    ) -> Self {
        Self {
            propagator,
            context,
            objects: Vec::new(),
            by_marker: HashMap::new(),
            frame,
            planet_rotation: 0.0,
            last_instant: None,
            next_object_id: 1,
        }
    }

    pub fn frame(&self) -> ReferenceFrame {
        self.frame
    }

    pub fn context(&self) -> &SceneContext<R> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut SceneContext<R> {
        &mut self.context
    }

    pub fn propagator(&self) -> &dyn Propagator {
        self.propagator.as_ref()
    }

    pub fn objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&TrackedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut TrackedObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn object_for_marker(&self, marker: MarkerId) -> Option<ObjectId> {
        self.by_marker.get(&marker).copied()
    }

    pub fn selected_ids(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.id)
            .collect()
    }

    /// Instant of the last position pass
    pub fn last_instant(&self) -> Option<satkit::Instant> {
        self.last_instant
    }

    pub fn planet_rotation(&self) -> f64 {
        self.planet_rotation
    }

    /// Discard every tracked object (selection and trails first), then track
    /// `entries`. Objects whose elements do not parse are kept for lookup
    /// but never get a marker.
    pub fn replace_objects(&mut self, entries: Vec<TleEntry>) -> IngestSummary {
        self.clear_objects();

        let mut summary = IngestSummary::default();
        for entry in entries {
            let id = ObjectId(self.next_object_id);
            self.next_object_id += 1;
            let mut object = TrackedObject::new(id, entry);
            if object.ensure_record(self.propagator.as_ref()).is_none() {
                summary.unusable += 1;
            }
            self.objects.push(object);
        }
        summary.objects = self.objects.len();

        log::info!(
            "Tracking {} objects ({} with unusable elements)",
            summary.objects - summary.unusable,
            summary.unusable
        );

        if let Some(at) = self.last_instant {
            self.tick(&at);
        }
        summary
    }

    pub fn clear_objects(&mut self) {
        for id in self.selected_ids() {
            self.deselect(id);
        }
        let renderer = self.context.renderer_mut();
        for object in self.objects.drain(..) {
            if let Some(marker) = object.marker {
                renderer.remove_marker(marker);
            }
        }
        self.by_marker.clear();
    }

    /// One position pass over every schedulable object plus the planet
    pub fn tick(&mut self, at: &satkit::Instant) {
        self.update_positions(at, false);
    }

    fn update_positions(&mut self, at: &satkit::Instant, frame_changed: bool) {
        let gmst = self.propagator.sidereal_time(at);
        let transform = self.frame.transform(gmst);
        let propagator = self.propagator.as_ref();
        let renderer = &mut self.context.renderer;

        let mut frozen = 0usize;
        for object in self.objects.iter_mut().filter(|o| o.is_schedulable()) {
            match position_at(propagator, object, at, &transform) {
                Some(position) => {
                    object.position = Some(position);
                    match object.marker {
                        Some(marker) => renderer.set_marker_position(marker, position),
                        None => {
                            let style = if object.selected {
                                MarkerStyle::HIGHLIGHT
                            } else {
                                MarkerStyle::DEFAULT
                            };
                            let marker = renderer.create_marker(position, style);
                            object.marker = Some(marker);
                            self.by_marker.insert(marker, object.id);
                        }
                    }
                }
                None => {
                    frozen += 1;
                    // A position from the other frame must not stay on screen
                    if frame_changed {
                        object.position = None;
                        if let Some(marker) = object.marker.take() {
                            renderer.remove_marker(marker);
                            self.by_marker.remove(&marker);
                        }
                    }
                }
            }
        }
        if frozen > 0 {
            log::info!("{} objects kept their last position this tick", frozen);
        }

        self.planet_rotation = match self.frame {
            ReferenceFrame::EarthFixed => gmst,
            ReferenceFrame::Inertial => {
                self.planet_rotation + INERTIAL_SPIN_DEG_PER_TICK.to_radians()
            }
        };
        renderer.set_planet_rotation(self.planet_rotation);
        renderer.render();

        self.last_instant = Some(*at);
    }

    /// Switch frames and re-derive every position and trail at `at`
    pub fn set_frame(&mut self, frame: ReferenceFrame, at: &satkit::Instant) {
        if frame == self.frame {
            return;
        }
        log::info!("Reference frame: {:?} -> {:?}", self.frame, frame);
        self.frame = frame;
        self.update_positions(at, true);

        for id in self.selected_ids() {
            self.detach_trail(id);
            self.attach_trail(id, at);
        }
    }

    /// Highlight `id` and attach its trail. Returns false for unknown or
    /// unschedulable objects.
    pub fn select(&mut self, id: ObjectId, at: &satkit::Instant) -> bool {
        let Some(object) = self.object_mut(id) else {
            return false;
        };
        if !object.is_schedulable() {
            log::debug!("'{}' has no usable elements, not selectable", object.name);
            return false;
        }
        if object.selected {
            return true;
        }
        object.selected = true;
        let marker = object.marker;
        log::debug!("Selected '{}'", object.name);

        if let Some(marker) = marker {
            self.context
                .renderer_mut()
                .set_marker_style(marker, MarkerStyle::HIGHLIGHT);
        }
        self.attach_trail(id, at);
        true
    }

    /// Remove the trail and restore the default marker look
    pub fn deselect(&mut self, id: ObjectId) {
        self.detach_trail(id);
        let Some(object) = self.object_mut(id) else {
            return;
        };
        if !object.selected {
            return;
        }
        object.selected = false;
        let marker = object.marker;
        log::debug!("Deselected '{}'", object.name);

        if let Some(marker) = marker {
            self.context
                .renderer_mut()
                .set_marker_style(marker, MarkerStyle::DEFAULT);
        }
    }

    fn attach_trail(&mut self, id: ObjectId, at: &satkit::Instant) {
        let frame = self.frame;
        let propagator = self.propagator.as_ref();
        let Some(object) = self.objects.iter_mut().find(|o| o.id == id) else {
            return;
        };
        let Some(record) = object.record() else {
            return;
        };

        let samples = sample_orbit(propagator, record, at, frame);
        if !samples.complete {
            log::debug!(
                "No trail for '{}': revolution not fully tracked ({} samples)",
                object.name,
                samples.points.len()
            );
            return;
        }

        let polyline = self
            .context
            .renderer
            .create_polyline(&samples.points, TRAIL_COLOR);
        object.trail = Some(OrbitTrail {
            polyline,
            points: samples.points,
            frame,
        });
    }

    fn detach_trail(&mut self, id: ObjectId) {
        let Some(object) = self.objects.iter_mut().find(|o| o.id == id) else {
            return;
        };
        if let Some(trail) = object.trail.take() {
            self.context.renderer.remove_polyline(trail.polyline);
        }
    }

    /// Nearest tracked object under a pixel position
    pub fn pick(&self, x: f32, y: f32) -> Option<ObjectId> {
        let ndc = self.context.viewport.to_ndc(x, y);
        self.context
            .renderer()
            .cast_ray(ndc)
            .into_iter()
            .find_map(|marker| self.object_for_marker(marker))
    }

    /// Telemetry of one object at `at`; `None` when it cannot be propagated
    pub fn telemetry(&mut self, id: ObjectId, at: &satkit::Instant) -> Option<Telemetry> {
        let propagator = self.propagator.as_ref();
        let object = self.objects.iter_mut().find(|o| o.id == id)?;
        propagation::telemetry(propagator, object, at)
    }

    /// Render-space position of a tracked object, if it has one
    pub fn position_of(&self, id: ObjectId) -> Option<Vec3> {
        self.object(id).and_then(|o| o.position)
    }
}
