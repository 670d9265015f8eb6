//! Point-mass ball physics against segment colliders
//!
//! Velocity is stored in arena units per tick, so a tick is just
//! `position += velocity` followed by a constant gravity step. Collisions are
//! found by sweeping the segment from the previous to the current position
//! across every plane and reflecting the travel angle about the plane's angle.

use glam::Vec2;

use super::geometry::{reflect_angle, segment_intersect};
use super::plane::{PlaneId, PlaneRegistry};
use crate::settings::Settings;
use crate::vector_angle;

/// Emitted once per bounce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub plane: PlaneId,
    /// Incoming travel angle minus outgoing travel angle
    pub bounce_angle: f32,
    /// Speed after restitution, in units per tick
    pub speed: f32,
}

/// Per-tick constants derived from [`Settings`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    /// Velocity lost to gravity every tick
    pub gravity_per_tick: f32,
    pub restitution: f32,
    /// Collisions are not tested outside these half-extents
    pub physics_half_extents: Vec2,
    pub drop_point: Vec2,
    pub max_rescans: u32,
}

impl PhysicsParams {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            gravity_per_tick: settings.gravity_per_tick(),
            restitution: settings.restitution,
            physics_half_extents: settings.physics_half_extents(),
            drop_point: settings.drop_point(),
            max_rescans: settings.max_collision_rescans,
        }
    }

    #[inline]
    fn in_physics_bounds(&self, p: Vec2) -> bool {
        let half = self.physics_half_extents;
        p.x >= -half.x && p.x <= half.x && p.y >= -half.y && p.y <= half.y
    }
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Swappable ball physics backend
pub trait BallPhysics {
    /// Reset to the drop point at rest
    fn drop(&mut self);

    /// Advance one fixed tick, reporting bounces through `on_collide`
    fn tick(&mut self, planes: &PlaneRegistry, on_collide: &mut dyn FnMut(CollisionEvent));

    fn position(&self) -> Vec2;

    fn velocity(&self) -> Vec2;
}

/// Where never-dropped balls wait, far below the arena
pub const PARKED_POSITION: Vec2 = Vec2::new(0.0, -1000.0);

/// The segment-sweep physics kernel
#[derive(Debug, Clone)]
pub struct SegmentBody {
    pub position: Vec2,
    pub previous_position: Vec2,
    /// Units per tick
    pub velocity: Vec2,
    params: PhysicsParams,
}

impl SegmentBody {
    pub fn new(params: PhysicsParams) -> Self {
        Self {
            position: PARKED_POSITION,
            previous_position: PARKED_POSITION,
            velocity: Vec2::ZERO,
            params,
        }
    }

    /// Place the body with an explicit velocity (units per tick)
    pub fn launch(&mut self, position: Vec2, velocity: Vec2) {
        self.position = position;
        self.previous_position = position;
        self.velocity = velocity;
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    /// Reflect off planes crossed by the previous-to-current sweep
    fn resolve_collisions(
        &mut self,
        planes: &PlaneRegistry,
        on_collide: &mut dyn FnMut(CollisionEvent),
    ) {
        let mut ball_angle = vector_angle(self.velocity);
        let mut last_hit: Option<PlaneId> = None;
        let mut rescans = 0u32;

        'scan: loop {
            for plane in planes.active() {
                // Grazing the plane we just left would bounce us straight back
                if last_hit == Some(plane.id) {
                    continue;
                }
                let Some(hit) =
                    segment_intersect(self.previous_position, self.position, plane.start(), plane.end())
                else {
                    continue;
                };
                last_hit = Some(plane.id);

                let speed = self.velocity.length() * self.params.restitution;
                let incoming = ball_angle;
                ball_angle = reflect_angle(plane.angle(), incoming);

                on_collide(CollisionEvent {
                    plane: plane.id,
                    bounce_angle: incoming - ball_angle,
                    speed,
                });
                log::trace!(
                    "bounce off {:?} at {}: {:.3} -> {:.3}",
                    plane.id,
                    hit,
                    incoming,
                    ball_angle
                );

                self.velocity = Vec2::new(ball_angle.cos(), ball_angle.sin()) * speed;
                self.previous_position = hit;
                self.position = hit + self.velocity;

                rescans += 1;
                if rescans > self.params.max_rescans {
                    break 'scan;
                }
                continue 'scan;
            }
            break;
        }
    }
}

impl Default for SegmentBody {
    fn default() -> Self {
        Self::new(PhysicsParams::default())
    }
}

impl BallPhysics for SegmentBody {
    fn drop(&mut self) {
        self.launch(self.params.drop_point, Vec2::ZERO);
    }

    fn tick(&mut self, planes: &PlaneRegistry, on_collide: &mut dyn FnMut(CollisionEvent)) {
        self.previous_position = self.position;
        self.position += self.velocity;
        self.velocity.y -= self.params.gravity_per_tick;

        // Balls far outside the arena never bounce
        if !self.params.in_physics_bounds(self.position) {
            return;
        }

        self.resolve_collisions(planes, on_collide);
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

/// Physics-free backend: balls appear at the drop point and stay there
#[derive(Debug, Clone)]
pub struct InertBody {
    position: Vec2,
    drop_point: Vec2,
}

impl InertBody {
    pub fn new(params: PhysicsParams) -> Self {
        Self {
            position: PARKED_POSITION,
            drop_point: params.drop_point,
        }
    }
}

impl BallPhysics for InertBody {
    fn drop(&mut self) {
        self.position = self.drop_point;
    }

    fn tick(&mut self, _planes: &PlaneRegistry, _on_collide: &mut dyn FnMut(CollisionEvent)) {}

    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        Vec2::ZERO
    }
}
