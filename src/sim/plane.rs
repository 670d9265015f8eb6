//! Line-segment colliders ("planes") and their registry
//!
//! Planes are stored in a slot arena addressed by stable [`PlaneId`]s. Removing
//! a plane frees its slot for reuse and bumps the slot's generation, so ids held
//! by input code never alias a newer plane. The ordered active list is only
//! touched between ticks.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::geometry::distance_to_segment;
use crate::consts::{PLANE_COLOR_DECAY_PER_SECOND, PLANE_MIN_BRIGHTNESS};
use crate::settings::Settings;
use crate::tuning::ToneScale;
use crate::vector_angle;

/// Stable handle to a plane slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaneId {
    index: u32,
    generation: u32,
}

impl PlaneId {
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// How many times the slot had been freed when this id was issued
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    plane: Option<Plane>,
}

/// Where a plane is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaneState {
    /// Has a start point only; not a collider yet
    Draft,
    /// Collider whose end point is still being dragged
    Active,
    /// Collider that no longer accepts edits and can be picked for erasing
    Frozen,
}

/// A directed line segment collider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plane {
    pub id: PlaneId,
    start: Vec2,
    end: Vec2,
    /// Direction from start to end, in [0, 2π)
    angle: f32,
    length: f32,
    playback_rate: f32,
    /// Flash color, brightened by hits and fading back to the resting level
    pub hit_color: Vec3,
    state: PlaneState,
}

impl Plane {
    fn new(id: PlaneId, start: Vec2) -> Self {
        Self {
            id,
            start,
            end: start,
            angle: 0.0,
            length: 0.0,
            playback_rate: 1.0,
            hit_color: Vec3::splat(PLANE_MIN_BRIGHTNESS),
            state: PlaneState::Draft,
        }
    }

    #[inline]
    pub fn start(&self) -> Vec2 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Vec2 {
        self.end
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[inline]
    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    #[inline]
    pub fn state(&self) -> PlaneState {
        self.state
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.state == PlaneState::Frozen
    }

    /// Colliders are committed and have non-zero length
    #[inline]
    pub fn is_collider(&self) -> bool {
        self.state != PlaneState::Draft && self.start != self.end
    }

    /// Assign a new end point; angle, length and playback rate move together
    fn set_end(&mut self, end: Vec2, scale: &ToneScale) {
        self.end = end;
        let span = self.end - self.start;
        self.length = span.length();
        self.angle = vector_angle(span);
        self.playback_rate = scale.frequency_from_length(self.length);
    }

    /// Ratchet the flash color up toward `strength * color`
    pub fn on_collide(&mut self, color: Vec3, strength: f32) {
        self.hit_color = self.hit_color.max(color * strength);
    }

    /// Fade the flash color, never below the resting brightness
    pub fn render_tick(&mut self, dt_seconds: f32) {
        let fade = PLANE_COLOR_DECAY_PER_SECOND * dt_seconds;
        self.hit_color = (self.hit_color - Vec3::splat(fade)).max(Vec3::splat(PLANE_MIN_BRIGHTNESS));
    }
}

/// Owner of every plane; the ordered active list drives collision testing
#[derive(Debug, Clone)]
pub struct PlaneRegistry {
    slots: Vec<Slot>,
    /// Empty slots, reused last-freed first
    free: Vec<u32>,
    /// Committed planes in commit order
    active: Vec<PlaneId>,
    half_extents: Vec2,
    scale: ToneScale,
    revision: u64,
}

impl PlaneRegistry {
    pub fn new(settings: &Settings) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            active: Vec::new(),
            half_extents: settings.half_extents(),
            scale: ToneScale::from_settings(settings),
            revision: 0,
        }
    }

    /// Bumped whenever the set of colliders or their geometry changes
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(-self.half_extents, self.half_extents)
    }

    /// Start drawing a plane at `start` (clamped to the arena)
    pub fn begin_plane(&mut self, start: Vec2) -> PlaneId {
        let start = self.clamp(start);
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = PlaneId {
            index,
            generation: slot.generation,
        };
        slot.plane = Some(Plane::new(id, start));
        log::debug!("Plane {:?} started at {}", id, start);
        id
    }

    /// Drag a plane's end point; the first call commits it as a collider
    ///
    /// Returns `false` when the plane is gone or frozen.
    pub fn update_end_point(&mut self, id: PlaneId, end: Vec2) -> bool {
        let end = self.clamp(end);
        let scale = &self.scale;
        let Some(plane) = Self::slot_plane_mut(&mut self.slots, id) else {
            return false;
        };

        match plane.state {
            PlaneState::Frozen => return false,
            PlaneState::Draft => {
                plane.state = PlaneState::Active;
                self.active.push(id);
                log::debug!("Plane {:?} committed", id);
            }
            PlaneState::Active => {}
        }

        plane.set_end(end, scale);
        self.revision += 1;
        true
    }

    /// Stop editing a plane and make it pickable; no-op for drafts and missing planes
    pub fn freeze(&mut self, id: PlaneId) {
        if let Some(plane) = self.get_mut(id)
            && plane.state == PlaneState::Active
        {
            plane.state = PlaneState::Frozen;
            log::debug!("Plane {:?} frozen ({:.3} long)", id, plane.length);
        }
    }

    /// Throw away a plane that never became a collider
    ///
    /// Returns `false` (and keeps the plane) if it was already committed.
    pub fn discard(&mut self, id: PlaneId) -> bool {
        if !self.get(id).is_some_and(|p| p.state == PlaneState::Draft) {
            return false;
        }
        self.release(id);
        log::debug!("Plane {:?} discarded", id);
        true
    }

    /// Remove a plane permanently; unknown or already removed ids are ignored
    pub fn disable(&mut self, id: PlaneId) {
        let Some(plane) = self.release(id) else {
            return;
        };
        if plane.state != PlaneState::Draft {
            self.active.retain(|&active| active != id);
            self.revision += 1;
        }
        log::debug!("Plane {:?} disabled", id);
    }

    /// Blend a ball's color into a plane's flash
    pub fn on_collide(&mut self, id: PlaneId, color: Vec3, strength: f32) {
        if let Some(plane) = self.get_mut(id) {
            plane.on_collide(color, strength);
        }
    }

    /// Fade every active plane's flash color
    pub fn render_tick(&mut self, dt_seconds: f32) {
        for &id in &self.active {
            if let Some(plane) = Self::slot_plane_mut(&mut self.slots, id) {
                plane.render_tick(dt_seconds);
            }
        }
    }

    pub fn get(&self, id: PlaneId) -> Option<&Plane> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.plane.as_ref())
    }

    fn get_mut(&mut self, id: PlaneId) -> Option<&mut Plane> {
        Self::slot_plane_mut(&mut self.slots, id)
    }

    fn slot_plane_mut(slots: &mut [Slot], id: PlaneId) -> Option<&mut Plane> {
        slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.plane.as_mut())
    }

    /// Empty a live slot and queue it for reuse under the next generation
    fn release(&mut self, id: PlaneId) -> Option<Plane> {
        let slot = self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)?;
        let plane = slot.plane.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(plane)
    }

    /// Number of slots ever allocated, live or free
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Committed planes in collision-test order
    pub fn active(&self) -> impl Iterator<Item = &Plane> + '_ {
        self.active
            .iter()
            .filter_map(|&id| self.get(id))
    }

    /// Committed planes that can actually be hit
    pub fn colliders(&self) -> impl Iterator<Item = &Plane> + '_ {
        self.active().filter(|p| p.is_collider())
    }

    #[inline]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Nearest frozen plane within `tolerance` of `point`
    pub fn pick(&self, point: Vec2, tolerance: f32) -> Option<PlaneId> {
        self.active()
            .filter(|p| p.is_frozen())
            .map(|p| (p.id, distance_to_segment(point, p.start, p.end)))
            .filter(|&(_, d)| d <= tolerance)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn registry() -> PlaneRegistry {
        PlaneRegistry::new(&Settings::default())
    }

    #[test]
    fn test_draft_is_not_a_collider() {
        let mut reg = registry();
        let id = reg.begin_plane(Vec2::ZERO);
        assert_eq!(reg.active_len(), 0);
        assert_eq!(reg.get(id).unwrap().state(), PlaneState::Draft);
        assert_eq!(reg.revision(), 0);
    }

    #[test]
    fn test_first_end_point_commits() {
        let mut reg = registry();
        let id = reg.begin_plane(Vec2::new(-1.0, 0.0));
        assert!(reg.update_end_point(id, Vec2::new(1.0, 0.0)));
        assert!(reg.update_end_point(id, Vec2::new(1.0, 1.0)));
        assert_eq!(reg.active_len(), 1);
        assert_eq!(reg.revision(), 2);
        assert!(reg.get(id).unwrap().is_collider());
    }

    #[test]
    fn test_angle_and_length_follow_end_point() {
        let mut reg = registry();
        let id = reg.begin_plane(Vec2::ZERO);
        reg.update_end_point(id, Vec2::new(0.0, -1.0));
        let plane = reg.get(id).unwrap();
        assert!((plane.angle() - 3.0 * PI / 2.0).abs() < 1e-5);
        assert!((plane.length() - 1.0).abs() < 1e-6);
        let rate = plane.playback_rate();

        reg.update_end_point(id, Vec2::new(-2.0, 0.0));
        let plane = reg.get(id).unwrap();
        assert!((plane.angle() - PI).abs() < 1e-5);
        assert!((plane.length() - 2.0).abs() < 1e-6);
        assert!(plane.playback_rate() < rate);
    }

    #[test]
    fn test_points_are_clamped() {
        let mut reg = registry();
        let id = reg.begin_plane(Vec2::new(-9.0, 9.0));
        reg.update_end_point(id, Vec2::new(9.0, 0.5));
        let plane = reg.get(id).unwrap();
        assert_eq!(plane.start(), Vec2::new(-2.5, 2.5));
        assert_eq!(plane.end(), Vec2::new(2.5, 0.5));
    }

    #[test]
    fn test_zero_length_commit_is_not_a_collider() {
        let mut reg = registry();
        let id = reg.begin_plane(Vec2::ONE);
        reg.update_end_point(id, Vec2::ONE);
        assert_eq!(reg.active_len(), 1);
        assert_eq!(reg.colliders().count(), 0);
    }

    #[test]
    fn test_freeze_is_idempotent() {
        let mut reg = registry();
        let draft = reg.begin_plane(Vec2::ZERO);
        reg.freeze(draft);
        assert_eq!(reg.get(draft).unwrap().state(), PlaneState::Draft);

        let id = reg.begin_plane(Vec2::ZERO);
        reg.update_end_point(id, Vec2::ONE);
        reg.freeze(id);
        reg.freeze(id);
        assert!(reg.get(id).unwrap().is_frozen());
        assert!(!reg.update_end_point(id, Vec2::new(2.0, 0.0)));
        assert_eq!(reg.get(id).unwrap().end(), Vec2::ONE);

        reg.disable(id);
        reg.freeze(id);
        assert!(reg.get(id).is_none());
    }

    #[test]
    fn test_disable_removes_and_ignores_repeats() {
        let mut reg = registry();
        let a = reg.begin_plane(Vec2::new(-1.0, 0.0));
        reg.update_end_point(a, Vec2::new(1.0, 0.0));
        let b = reg.begin_plane(Vec2::new(-1.0, 1.0));
        reg.update_end_point(b, Vec2::new(1.0, 1.0));

        reg.disable(a);
        let rev = reg.revision();
        reg.disable(a);
        reg.disable(PlaneId {
            index: 99,
            generation: 0,
        });
        assert_eq!(reg.revision(), rev);
        assert_eq!(reg.active().map(|p| p.id).collect::<Vec<_>>(), vec![b]);
        assert!(!reg.update_end_point(a, Vec2::ZERO));
    }

    #[test]
    fn test_discard_only_drafts() {
        let mut reg = registry();
        let draft = reg.begin_plane(Vec2::ZERO);
        assert!(reg.discard(draft));
        assert!(reg.get(draft).is_none());
        assert!(!reg.discard(draft));

        let id = reg.begin_plane(Vec2::ZERO);
        reg.update_end_point(id, Vec2::ONE);
        assert!(!reg.discard(id));
        assert_eq!(reg.active_len(), 1);
    }

    #[test]
    fn test_freed_slots_are_reused_without_aliasing() {
        let mut reg = registry();
        let click = reg.begin_plane(Vec2::ZERO);
        assert!(reg.discard(click));

        let plane = reg.begin_plane(Vec2::new(-1.0, 0.0));
        assert_eq!(plane.index(), click.index());
        assert_ne!(plane, click);
        assert!(reg.get(click).is_none());
        assert!(!reg.update_end_point(click, Vec2::ONE));
        reg.disable(click);
        assert!(reg.get(plane).is_some());

        for _ in 0..50 {
            let id = reg.begin_plane(Vec2::ZERO);
            reg.discard(id);
        }
        assert_eq!(reg.slot_count(), 2);

        reg.update_end_point(plane, Vec2::new(1.0, 0.0));
        reg.disable(plane);
        let next = reg.begin_plane(Vec2::ZERO);
        reg.update_end_point(next, Vec2::ONE);
        assert_eq!(reg.active().map(|p| p.id).collect::<Vec<_>>(), vec![next]);
    }

    #[test]
    fn test_hit_color_ratchets() {
        let mut reg = registry();
        let id = reg.begin_plane(Vec2::ZERO);
        reg.update_end_point(id, Vec2::ONE);
        reg.on_collide(id, Vec3::new(1.0, 0.5, 0.0), 0.8);
        reg.on_collide(id, Vec3::new(1.0, 1.0, 1.0), 0.2);
        let color = reg.get(id).unwrap().hit_color;
        assert!((color - Vec3::new(0.8, 0.4, 0.2)).length() < 1e-6);
    }

    #[test]
    fn test_hit_color_decays_to_floor() {
        let mut reg = registry();
        let id = reg.begin_plane(Vec2::ZERO);
        reg.update_end_point(id, Vec2::ONE);
        reg.on_collide(id, Vec3::ONE, 1.0);

        reg.render_tick(0.1);
        let color = reg.get(id).unwrap().hit_color;
        assert!((color.x - 0.7).abs() < 1e-6);

        reg.render_tick(10.0);
        assert_eq!(reg.get(id).unwrap().hit_color, Vec3::splat(PLANE_MIN_BRIGHTNESS));
    }

    #[test]
    fn test_pick_frozen_only() {
        let mut reg = registry();
        let a = reg.begin_plane(Vec2::new(-1.0, 0.0));
        reg.update_end_point(a, Vec2::new(1.0, 0.0));
        assert_eq!(reg.pick(Vec2::new(0.0, 0.05), 0.1), None);

        reg.freeze(a);
        let b = reg.begin_plane(Vec2::new(-1.0, 0.2));
        reg.update_end_point(b, Vec2::new(1.0, 0.2));
        reg.freeze(b);

        assert_eq!(reg.pick(Vec2::new(0.0, 0.05), 0.1), Some(a));
        assert_eq!(reg.pick(Vec2::new(0.0, 0.16), 0.1), Some(b));
        assert_eq!(reg.pick(Vec2::new(0.0, 2.0), 0.1), None);
    }
}
