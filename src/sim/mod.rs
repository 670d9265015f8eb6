//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (planes in commit order, balls by pool index)
//! - No rendering, audio or platform dependencies

pub mod body;
pub mod geometry;
pub mod guideline;
pub mod plane;
pub mod pool;
pub mod scheduler;

pub use body::{BallPhysics, CollisionEvent, InertBody, PhysicsParams, SegmentBody};
pub use geometry::{reflect_angle, segment_intersect};
pub use guideline::Guideline;
pub use plane::{Plane, PlaneId, PlaneRegistry, PlaneState};
pub use pool::{Ball, BallCollision, BallPool, InstanceBuffers, VoiceId};
pub use scheduler::{DropTimer, FixedStep, FramePlan, Scheduler, Tempo};
