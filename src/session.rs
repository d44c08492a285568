//! Composition root
//!
//! Every mutation of the tracked objects, the selection and the catalog cache
//! goes through [`Session`] on the control thread. Network calls run on the
//! fetch worker; their results re-enter here via [`Session::pump`].

use std::sync::Arc;
use std::time::Duration;

use crate::data::{
    parse_lenient, CatalogCacheManager, CatalogSource, FetchResponse, FetchWorker, SearchIndex,
    MAX_RESULTS,
};
use crate::error::FetchError;
use crate::propagation::{ReferenceFrame, Telemetry};
use crate::renderer::Renderer;
use crate::scene::{ObjectId, SceneSynchronizer, SelectionController, SimulatedClock};

/// Outcomes the UI layer reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A group's objects replaced the tracked set
    GroupLoaded {
        id: String,
        objects: usize,
        skipped: usize,
    },
    /// The latest requested group could not be fetched
    GroupLoadFailed { id: String, error: FetchError },
    /// A response for a group the user already switched away from
    FetchDiscarded { id: String },
}

pub struct Session<R: Renderer> {
    catalog: CatalogCacheManager,
    worker: FetchWorker,
    scene: SceneSynchronizer<R>,
    selection: SelectionController,
    search: SearchIndex,
    clock: SimulatedClock,
    /// Bumped on every group switch; responses from older generations are stale
    generation: u64,
    active_group: Option<String>,
    pending_group: Option<String>,
}

impl<R: Renderer> Session<R> {
    pub fn new(
        catalog: CatalogCacheManager,
        source: Arc<dyn CatalogSource>,
        scene: SceneSynchronizer<R>,
        selection: SelectionController,
        clock: SimulatedClock,
    ) -> Self {
        Self {
            catalog,
            worker: FetchWorker::spawn(source),
            scene,
            selection,
            search: SearchIndex::default(),
            clock,
            generation: 0,
            active_group: None,
            pending_group: None,
        }
    }

    pub fn scene(&self) -> &SceneSynchronizer<R> {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneSynchronizer<R> {
        &mut self.scene
    }

    pub fn catalog(&self) -> &CatalogCacheManager {
        &self.catalog
    }

    pub fn clock(&self) -> &SimulatedClock {
        &self.clock
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Group whose objects are currently tracked
    pub fn active_group(&self) -> Option<&str> {
        self.active_group.as_deref()
    }

    /// Group requested but not yet loaded
    pub fn pending_group(&self) -> Option<&str> {
        self.pending_group.as_deref()
    }

    /// Switch to a catalog group. A cached group is ingested immediately and
    /// its event returned; otherwise a fetch is queued and the result
    /// arrives through [`Session::pump`].
    pub fn select_group(&mut self, id: &str) -> Result<Option<SessionEvent>, FetchError> {
        let group = self
            .catalog
            .group(id)
            .ok_or_else(|| FetchError::UnknownGroup(id.to_string()))?;
        self.generation += 1;

        if self.catalog.cached(id).is_some() {
            log::info!("Serving group '{}' from cache", id);
            self.pending_group = None;
            return Ok(Some(self.ingest(id)));
        }

        log::info!("Fetching group '{}' from {}", id, group.source.url());
        self.worker.request(self.generation, id, &group.source)?;
        self.pending_group = Some(id.to_string());
        Ok(None)
    }

    /// Apply every fetch result that has arrived, without blocking
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        loop {
            match self.worker.try_next() {
                Ok(Some(response)) => events.push(self.apply(response)),
                Ok(None) => break,
                Err(e) => {
                    log::error!("Catalog fetching stopped: {}", e);
                    break;
                }
            }
        }
        events
    }

    /// Block until the pending group resolves or `timeout` passes without a
    /// response
    pub fn wait_for_group(&mut self, timeout: Duration) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while self.pending_group.is_some() {
            match self.worker.next_blocking(timeout) {
                Some(response) => events.push(self.apply(response)),
                None => {
                    log::warn!("Timed out waiting for catalog group");
                    break;
                }
            }
        }
        events
    }

    fn apply(&mut self, response: FetchResponse) -> SessionEvent {
        let FetchResponse {
            generation,
            group_id,
            result,
        } = response;
        let current = generation == self.generation;

        match result {
            Ok(text) => {
                let bytes = text.len();
                if let Err(e) = self.catalog.store(&group_id, text) {
                    log::error!("Dropping fetched text: {}", e);
                }
                if !current {
                    log::info!(
                        "Discarding superseded response for group '{}' ({} bytes cached)",
                        group_id,
                        bytes
                    );
                    return SessionEvent::FetchDiscarded { id: group_id };
                }
                self.pending_group = None;
                self.ingest(&group_id)
            }
            Err(error) => {
                if !current {
                    log::info!("Discarding superseded failure for group '{}': {}", group_id, error);
                    return SessionEvent::FetchDiscarded { id: group_id };
                }
                log::error!("Failed to load group '{}': {}", group_id, error);
                self.pending_group = None;
                SessionEvent::GroupLoadFailed {
                    id: group_id,
                    error,
                }
            }
        }
    }

    /// Replace the tracked objects with the cached text of `id`
    fn ingest(&mut self, id: &str) -> SessionEvent {
        let report = parse_lenient(self.catalog.cached(id).unwrap_or_default());
        let skipped = report.skipped.len();
        let summary = self.scene.replace_objects(report.entries);
        self.search = SearchIndex::build(self.scene.objects());
        self.active_group = Some(id.to_string());

        if self.scene.last_instant().is_none() {
            let at = *self.clock.current_time();
            self.scene.tick(&at);
        }

        log::info!(
            "Loaded group '{}': {} objects, {} malformed records skipped",
            id,
            summary.objects,
            skipped
        );
        SessionEvent::GroupLoaded {
            id: id.to_string(),
            objects: summary.objects,
            skipped,
        }
    }

    /// Fixed-interval timer. Returns whether a position pass ran.
    pub fn on_timer(&mut self) -> bool {
        match self.clock.on_timer() {
            Some(at) => {
                self.scene.tick(&at);
                true
            }
            None => false,
        }
    }

    /// Jump to a user-chosen instant and stop following the wall clock
    pub fn scrub(&mut self, at: satkit::Instant) {
        let at = self.clock.scrub(at);
        log::debug!("Scrubbed to {}", self.clock.format_time());
        self.scene.tick(&at);
    }

    pub fn resume_realtime(&mut self) {
        let at = self.clock.resume_realtime();
        self.scene.tick(&at);
    }

    pub fn set_frame(&mut self, frame: ReferenceFrame) {
        let at = *self.clock.current_time();
        self.scene.set_frame(frame, &at);
    }

    pub fn toggle_frame(&mut self) -> ReferenceFrame {
        let frame = self.scene.frame().toggled();
        self.set_frame(frame);
        frame
    }

    /// Pointer click at a pixel position: pick and toggle
    pub fn click(&mut self, x: f32, y: f32) -> Option<ObjectId> {
        let at = *self.clock.current_time();
        self.selection.click(&mut self.scene, x, y, &at)
    }

    pub fn toggle_selection(&mut self, id: ObjectId) -> bool {
        let at = *self.clock.current_time();
        self.selection.toggle(&mut self.scene, id, &at)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear(&mut self.scene);
    }

    pub fn search(&self, query: &str) -> Vec<ObjectId> {
        self.search.search(query, MAX_RESULTS)
    }

    /// Telemetry at the current simulated instant for every selected object
    /// that can be propagated
    pub fn telemetry_for_selected(&mut self) -> Vec<Telemetry> {
        let at = *self.clock.current_time();
        self.scene
            .selected_ids()
            .into_iter()
            .filter_map(|id| self.scene.telemetry(id, &at))
            .collect()
    }
}
