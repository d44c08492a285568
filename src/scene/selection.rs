//! Selection state and pointer picking

use super::synchronizer::SceneSynchronizer;
use super::tracked::ObjectId;
use crate::renderer::Renderer;

/// How many objects may be selected at once, fixed at composition time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SelectionMode {
    #[default]
    Single,
    Multiple,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionController {
    mode: SelectionMode,
}

impl SelectionController {
    pub fn new(mode: SelectionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Flip the selection state of `id`. Returns whether it is now selected.
    ///
    /// In single mode every other selection is fully torn down (trail
    /// removed, marker restored) before the new one is applied. Objects
    /// without usable elements are refused and the selection is untouched.
    pub fn toggle<R: Renderer>(
        &self,
        scene: &mut SceneSynchronizer<R>,
        id: ObjectId,
        at: &satkit::Instant,
    ) -> bool {
        let Some(object) = scene.object(id) else {
            return false;
        };
        if object.selected {
            scene.deselect(id);
            return false;
        }
        if !object.is_schedulable() {
            log::debug!("'{}' cannot be selected, keeping current selection", object.name);
            return false;
        }

        if self.mode == SelectionMode::Single {
            for other in scene.selected_ids() {
                scene.deselect(other);
            }
        }
        scene.select(id, at)
    }

    pub fn clear<R: Renderer>(&self, scene: &mut SceneSynchronizer<R>) {
        let selected = scene.selected_ids();
        if !selected.is_empty() {
            log::debug!("Clearing {} selected objects", selected.len());
        }
        for id in selected {
            scene.deselect(id);
        }
    }

    /// Nearest object under the pointer, `None` on a miss
    pub fn pick_at<R: Renderer>(
        &self,
        scene: &SceneSynchronizer<R>,
        x: f32,
        y: f32,
    ) -> Option<ObjectId> {
        scene.pick(x, y)
    }

    /// Pick and toggle in one step
    pub fn click<R: Renderer>(
        &self,
        scene: &mut SceneSynchronizer<R>,
        x: f32,
        y: f32,
        at: &satkit::Instant,
    ) -> Option<ObjectId> {
        let id = self.pick_at(scene, x, y)?;
        self.toggle(scene, id, at);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::propagator::tests::iss_instant;
    use crate::renderer::MarkerStyle;
    use crate::scene::synchronizer::tests::{broken, canx5, iss, synchronizer};

    #[test]
    fn test_toggle_twice_restores_unselected_state() {
        let mut scene = synchronizer();
        scene.replace_objects(vec![iss()]);
        scene.tick(&iss_instant());
        let id = scene.objects()[0].id;
        let marker = scene.objects()[0].marker.unwrap();
        let controller = SelectionController::new(SelectionMode::Single);

        assert!(controller.toggle(&mut scene, id, &iss_instant()));
        assert!(scene.object(id).unwrap().trail.is_some());
        assert_eq!(scene.context().renderer().polyline_count(), 1);
        assert_eq!(
            scene.context().renderer().marker(marker).unwrap().style,
            MarkerStyle::HIGHLIGHT
        );

        assert!(!controller.toggle(&mut scene, id, &iss_instant()));
        let object = scene.object(id).unwrap();
        assert!(!object.selected);
        assert!(object.trail.is_none());
        assert_eq!(scene.context().renderer().polyline_count(), 0);
        assert_eq!(
            scene.context().renderer().marker(marker).unwrap().style,
            MarkerStyle::DEFAULT
        );
    }

    #[test]
    fn test_single_mode_replaces_previous_selection() {
        let mut scene = synchronizer();
        scene.replace_objects(vec![iss(), canx5()]);
        scene.tick(&iss_instant());
        let a = scene.objects()[0].id;
        let b = scene.objects()[1].id;
        let marker_a = scene.objects()[0].marker.unwrap();
        let controller = SelectionController::new(SelectionMode::Single);

        controller.toggle(&mut scene, a, &iss_instant());
        controller.toggle(&mut scene, b, &iss_instant());

        assert_eq!(scene.selected_ids(), vec![b]);
        assert!(scene.object(a).unwrap().trail.is_none());
        assert_eq!(scene.context().renderer().polyline_count(), 1);
        assert_eq!(
            scene.context().renderer().marker(marker_a).unwrap().style,
            MarkerStyle::DEFAULT
        );
    }

    #[test]
    fn test_unusable_object_keeps_single_selection() {
        let mut scene = synchronizer();
        scene.replace_objects(vec![iss(), broken()]);
        scene.tick(&iss_instant());
        let good = scene.objects()[0].id;
        let bad = scene.objects()[1].id;
        let controller = SelectionController::new(SelectionMode::Single);

        assert!(controller.toggle(&mut scene, good, &iss_instant()));
        assert!(!controller.toggle(&mut scene, bad, &iss_instant()));

        assert_eq!(scene.selected_ids(), vec![good]);
        assert!(scene.object(good).unwrap().trail.is_some());
        assert_eq!(scene.context().renderer().polyline_count(), 1);
    }

    #[test]
    fn test_multiple_mode_accumulates_and_clears() {
        let mut scene = synchronizer();
        scene.replace_objects(vec![iss(), canx5()]);
        scene.tick(&iss_instant());
        let a = scene.objects()[0].id;
        let b = scene.objects()[1].id;
        let controller = SelectionController::new(SelectionMode::Multiple);

        controller.toggle(&mut scene, a, &iss_instant());
        controller.toggle(&mut scene, b, &iss_instant());
        assert_eq!(scene.selected_ids(), vec![a, b]);
        assert_eq!(scene.context().renderer().polyline_count(), 2);

        controller.toggle(&mut scene, a, &iss_instant());
        assert_eq!(scene.selected_ids(), vec![b]);

        controller.clear(&mut scene);
        assert!(scene.selected_ids().is_empty());
        assert_eq!(scene.context().renderer().polyline_count(), 0);
    }

    #[test]
    fn test_click_on_marker_selects_it() {
        let mut scene = synchronizer();
        scene.replace_objects(vec![iss()]);
        scene.tick(&iss_instant());
        let id = scene.objects()[0].id;
        let position = scene.position_of(id).unwrap();

        // Look at the object from above it so the planet cannot hide it
        let dir = position.normalize();
        let camera = &mut scene.context_mut().renderer_mut().camera;
        camera.elevation = dir.y.asin();
        camera.azimuth = dir.x.atan2(dir.z);

        let viewport = scene.context().viewport;
        let camera = scene.context().renderer().camera.clone();
        let ndc = camera.project(position, viewport.aspect_ratio()).unwrap();
        let pixel = viewport.to_screen(ndc);

        let controller = SelectionController::default();
        assert_eq!(controller.pick_at(&scene, pixel.x, pixel.y), Some(id));
        assert_eq!(controller.click(&mut scene, pixel.x, pixel.y, &iss_instant()), Some(id));
        assert!(scene.object(id).unwrap().selected);
    }

    #[test]
    fn test_click_on_empty_space_is_a_miss() {
        let mut scene = synchronizer();
        scene.replace_objects(vec![iss()]);
        scene.tick(&iss_instant());

        let controller = SelectionController::default();
        assert_eq!(controller.click(&mut scene, 1.0, 1.0, &iss_instant()), None);
        assert!(scene.selected_ids().is_empty());
    }
}
