//! Trajectory preview
//!
//! A private ghost ball is dropped from the canonical drop point and stepped
//! with the same kernel as the real balls, so the preview matches what an
//! undisturbed ball will do.

use glam::Vec2;

use super::body::{BallPhysics, PhysicsParams, SegmentBody};
use super::plane::PlaneRegistry;
use crate::settings::Settings;

/// Fixed-length preview path
#[derive(Debug, Clone)]
pub struct Guideline {
    ghost: SegmentBody,
    points: Vec<Vec2>,
    /// Ghost stops once it leaves these half-extents (left, right, bottom)
    exit_half_extents: Vec2,
    /// Slots filled by simulation before the ghost left (the rest repeat the exit point)
    simulated: usize,
    /// Registry revision the points were computed for
    revision: Option<u64>,
}

impl Guideline {
    pub fn new(settings: &Settings) -> Self {
        let capacity = settings.guideline_capacity.max(1);
        Self {
            ghost: SegmentBody::new(PhysicsParams::from_settings(settings)),
            points: vec![Vec2::ZERO; capacity],
            exit_half_extents: settings.half_extents() * 2.0,
            simulated: 0,
            revision: None,
        }
    }

    #[inline]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.points.len()
    }

    /// Number of points produced by simulation, including the exit point
    #[inline]
    pub fn simulated_len(&self) -> usize {
        self.simulated
    }

    /// Whether the points predate the registry's current contents
    pub fn is_stale(&self, planes: &PlaneRegistry) -> bool {
        self.revision != Some(planes.revision())
    }

    #[inline]
    fn has_exited(&self, p: Vec2) -> bool {
        let half = self.exit_half_extents;
        p.x < -half.x || p.x > half.x || p.y < -half.y
    }

    /// Re-simulate the preview against the current planes
    pub fn recompute(&mut self, planes: &PlaneRegistry) {
        self.ghost.drop();
        self.points[0] = self.ghost.position();

        let mut filled = 1;
        while filled < self.points.len() {
            self.ghost.tick(planes, &mut |_| {});
            let position = self.ghost.position();
            self.points[filled] = position;
            filled += 1;
            if self.has_exited(position) {
                break;
            }
        }

        let last = self.points[filled - 1];
        self.points[filled..].fill(last);

        self.simulated = filled;
        self.revision = Some(planes.revision());
        log::debug!(
            "Guideline recomputed: {} simulated points of {}",
            filled,
            self.points.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(capacity: usize) -> Settings {
        Settings {
            guideline_capacity: capacity,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_point_is_drop_point() {
        let s = settings(64);
        let planes = PlaneRegistry::new(&s);
        let mut guideline = Guideline::new(&s);
        guideline.recompute(&planes);
        assert_eq!(guideline.points()[0], s.drop_point());
    }

    #[test]
    fn test_slots_after_exit_repeat_exit_point() {
        let s = settings(5000);
        let planes = PlaneRegistry::new(&s);
        let mut guideline = Guideline::new(&s);
        guideline.recompute(&planes);

        let exited = guideline.simulated_len();
        assert!(exited < guideline.capacity());
        let exit = guideline.points()[exited - 1];
        assert!(exit.y < -5.0);
        assert!(guideline.points()[exited..].iter().all(|&p| p == exit));
    }

    #[test]
    fn test_short_guideline_is_completely_simulated() {
        let s = settings(10);
        let planes = PlaneRegistry::new(&s);
        let mut guideline = Guideline::new(&s);
        guideline.recompute(&planes);
        assert_eq!(guideline.simulated_len(), 10);
        assert!(guideline.points()[9].y < guideline.points()[0].y);
    }

    #[test]
    fn test_recompute_follows_planes() {
        let s = settings(5000);
        let mut planes = PlaneRegistry::new(&s);
        let mut guideline = Guideline::new(&s);
        guideline.recompute(&planes);
        let free_fall_exit = guideline.points()[guideline.capacity() - 1];

        // A ramp under the drop point throws the ball to the right
        let id = planes.begin_plane(glam::Vec2::new(-2.5, 1.0));
        planes.update_end_point(id, glam::Vec2::new(0.0, 0.0));
        assert!(guideline.is_stale(&planes));
        guideline.recompute(&planes);
        assert!(!guideline.is_stale(&planes));

        let ramp_exit = guideline.points()[guideline.capacity() - 1];
        assert!(ramp_exit.x > free_fall_exit.x);
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let s = settings(2000);
        let mut planes = PlaneRegistry::new(&s);
        let id = planes.begin_plane(glam::Vec2::new(-2.5, 0.5));
        planes.update_end_point(id, glam::Vec2::new(1.0, -1.0));

        let mut a = Guideline::new(&s);
        let mut b = Guideline::new(&s);
        a.recompute(&planes);
        b.recompute(&planes);
        a.recompute(&planes);
        assert_eq!(a.points(), b.points());
    }
}
