//! In-memory scene graph
//!
//! Holds markers, trail polylines and the planet orientation, answers
//! picking queries against the orbit camera, and flattens everything into
//! `Pod` buffers for upload:
//! - one [`MarkerInstance`] per visible marker
//! - one [`TrailVertex`] strip per polyline

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};

use super::satellites::{trail_vertices, MarkerInstance, MarkerStyle, TrailVertex};
use super::{Camera, MarkerId, PolylineId, Renderer};

/// Markers are hard to hit at their drawn size; pick against at least this radius
const MIN_PICK_RADIUS: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub position: Vec3,
    pub style: MarkerStyle,
}

pub struct HeadlessScene {
    pub camera: Camera,
    aspect_ratio: f32,
    markers: BTreeMap<MarkerId, Marker>,
    polylines: BTreeMap<PolylineId, Vec<TrailVertex>>,
    next_id: u64,
    planet_rotation: f64,
    frames_rendered: u64,
    visible_markers: usize,
}

impl HeadlessScene {
    pub fn new(camera: Camera, aspect_ratio: f32) -> Self {
        Self {
            camera,
            aspect_ratio,
            markers: BTreeMap::new(),
            polylines: BTreeMap::new(),
            next_id: 1,
            planet_rotation: 0.0,
            frames_rendered: 0,
            visible_markers: 0,
        }
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(&id)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn polyline(&self, id: PolylineId) -> Option<&[TrailVertex]> {
        self.polylines.get(&id).map(Vec::as_slice)
    }

    pub fn polyline_count(&self) -> usize {
        self.polylines.len()
    }

    pub fn planet_rotation(&self) -> f64 {
        self.planet_rotation
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Markers not hidden behind the planet at the last `render`
    pub fn visible_markers(&self) -> usize {
        self.visible_markers
    }

    /// Instance buffer contents for markers visible from the camera
    pub fn instances(&self) -> Vec<MarkerInstance> {
        let camera_pos = self.camera.position();
        self.markers
            .values()
            .filter(|m| !is_occluded_by_earth(camera_pos, m.position))
            .map(|m| MarkerInstance::new(m.position, m.style))
            .collect()
    }

    pub fn instance_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.instances()).to_vec()
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Renderer for HeadlessScene {
    fn create_marker(&mut self, position: Vec3, style: MarkerStyle) -> MarkerId {
        let id = MarkerId(self.allocate());
        self.markers.insert(id, Marker { position, style });
        id
    }

    fn set_marker_position(&mut self, marker: MarkerId, position: Vec3) {
        if let Some(m) = self.markers.get_mut(&marker) {
            m.position = position;
        }
    }

    fn set_marker_style(&mut self, marker: MarkerId, style: MarkerStyle) {
        if let Some(m) = self.markers.get_mut(&marker) {
            m.style = style;
        }
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        if self.markers.remove(&marker).is_none() {
            log::warn!("Removing unknown marker {:?}", marker);
        }
    }

    fn create_polyline(&mut self, points: &[Vec3], color: [f32; 4]) -> PolylineId {
        let id = PolylineId(self.allocate());
        self.polylines.insert(id, trail_vertices(points, color));
        id
    }

    fn remove_polyline(&mut self, polyline: PolylineId) {
        if self.polylines.remove(&polyline).is_none() {
            log::warn!("Removing unknown polyline {:?}", polyline);
        }
    }

    fn set_planet_rotation(&mut self, angle: f64) {
        self.planet_rotation = angle;
    }

    fn cast_ray(&self, ndc: Vec2) -> Vec<MarkerId> {
        let ray = self.camera.ray_from_ndc(ndc, self.aspect_ratio);
        let earth_hit = ray.intersect_sphere(Vec3::ZERO, 1.0);

        let mut hits: Vec<(f32, MarkerId)> = self
            .markers
            .iter()
            .filter_map(|(id, m)| {
                let t = ray.intersect_sphere(m.position, m.style.size.max(MIN_PICK_RADIUS))?;
                match earth_hit {
                    Some(earth_t) if earth_t < t => None,
                    _ => Some((t, *id)),
                }
            })
            .collect();

        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    fn render(&mut self) {
        let camera_pos = self.camera.position();
        self.visible_markers = self
            .markers
            .values()
            .filter(|m| !is_occluded_by_earth(camera_pos, m.position))
            .count();
        self.frames_rendered += 1;
        log::trace!(
            "Frame {}: {}/{} markers visible, {} trails",
            self.frames_rendered,
            self.visible_markers,
            self.markers.len(),
            self.polylines.len()
        );
    }

    fn dispose(&mut self) {
        if !self.markers.is_empty() || !self.polylines.is_empty() {
            log::debug!(
                "Disposing {} markers and {} polylines",
                self.markers.len(),
                self.polylines.len()
            );
        }
        self.markers.clear();
        self.polylines.clear();
        self.visible_markers = 0;
    }
}

/// Whether the segment from the camera to `point` passes through the unit sphere
fn is_occluded_by_earth(camera_pos: Vec3, point: Vec3) -> bool {
    if camera_pos.length_squared() <= 1.0 {
        return false;
    }
    let dir = point - camera_pos;
    let a = dir.dot(dir);
    if a <= 0.0 {
        return false;
    }

    let b = 2.0 * camera_pos.dot(dir);
    let c = camera_pos.dot(camera_pos) - 1.0; // Earth radius = 1 in render units
    let disc = b * b - 4.0 * a * c;
    if disc <= 0.0 {
        return false;
    }

    let sqrt_disc = disc.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);
    let (tmin, tmax) = if t1 < t2 { (t1, t2) } else { (t2, t1) };

    (0.0..=1.0).contains(&tmin) || (0.0..=1.0).contains(&tmax)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Camera on the +Z axis looking at the origin
    fn scene() -> HeadlessScene {
        let camera = Camera {
            elevation: 0.0,
            ..Camera::default()
        };
        HeadlessScene::new(camera, 1.0)
    }

    #[test]
    fn test_marker_lifecycle() {
        let mut scene = scene();
        let id = scene.create_marker(Vec3::X * 2.0, MarkerStyle::DEFAULT);
        assert_eq!(scene.marker_count(), 1);

        scene.set_marker_position(id, Vec3::Y * 2.0);
        scene.set_marker_style(id, MarkerStyle::HIGHLIGHT);
        let m = scene.marker(id).unwrap();
        assert_eq!(m.position, Vec3::Y * 2.0);
        assert_eq!(m.style, MarkerStyle::HIGHLIGHT);

        scene.remove_marker(id);
        assert!(scene.marker(id).is_none());
    }

    #[test]
    fn test_pick_returns_nearest_first() {
        let mut scene = scene();
        let far = scene.create_marker(Vec3::new(0.0, 0.0, 1.5), MarkerStyle::DEFAULT);
        let near = scene.create_marker(Vec3::new(0.0, 0.0, 2.5), MarkerStyle::DEFAULT);
        let _off_axis = scene.create_marker(Vec3::new(1.5, 1.5, 0.0), MarkerStyle::DEFAULT);

        assert_eq!(scene.cast_ray(Vec2::ZERO), vec![near, far]);
    }

    #[test]
    fn test_pick_ignores_markers_behind_earth() {
        let mut scene = scene();
        scene.create_marker(Vec3::new(0.0, 0.0, -1.5), MarkerStyle::DEFAULT);
        assert!(scene.cast_ray(Vec2::ZERO).is_empty());
    }

    #[test]
    fn test_pick_miss_is_empty() {
        let mut scene = scene();
        scene.create_marker(Vec3::new(0.0, 0.0, 1.5), MarkerStyle::DEFAULT);
        assert!(scene.cast_ray(Vec2::new(0.9, 0.9)).is_empty());
    }

    #[test]
    fn test_occlusion_and_instances() {
        let mut scene = scene();
        scene.create_marker(Vec3::new(0.0, 0.0, 1.5), MarkerStyle::DEFAULT);
        scene.create_marker(Vec3::new(0.0, 0.0, -1.5), MarkerStyle::HIGHLIGHT);
        scene.render();

        assert_eq!(scene.visible_markers(), 1);
        assert_eq!(scene.frames_rendered(), 1);
        let instances = scene.instances();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].position, [0.0, 0.0, 1.5]);
        assert_eq!(scene.instance_bytes().len(), 32);
    }

    #[test]
    fn test_polylines_and_dispose() {
        let mut scene = scene();
        let points = [Vec3::X * 1.1, Vec3::Y * 1.1, Vec3::Z * 1.1];
        let line = scene.create_polyline(&points, [1.0; 4]);
        scene.create_marker(Vec3::X * 2.0, MarkerStyle::DEFAULT);
        assert_eq!(scene.polyline(line).unwrap().len(), 3);

        scene.dispose();
        assert_eq!(scene.marker_count(), 0);
        assert_eq!(scene.polyline_count(), 0);
    }

    #[test]
    fn test_planet_orientation() {
        let mut scene = scene();
        scene.set_planet_rotation(1.25);
        assert_eq!(scene.planet_rotation(), 1.25);
    }
}
