//! Pachinko Planes - balls fall, bounce off drawn line segments, and sing
//!
//! Core modules:
//! - `sim`: Deterministic simulation (segment physics, ball pool, guideline)
//! - `tuning`: Segment length to whole-tone playback rate
//! - `audio`: Collision events to tone triggers
//! - `renderer`: Instance buffer upload seam
//! - `input`: Pointer-driven plane drawing and erasing
//! - `playground`: Per-frame composition of all of the above
//! - `settings`: Tunable constants, persisted as JSON

pub mod audio;
pub mod input;
pub mod playground;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use playground::Playground;
pub use settings::Settings;

use glam::Vec2;

/// Default simulation constants
pub mod consts {
    /// Arena half-extents (the visible arena is 5 x 5 units)
    pub const ARENA_HALF_WIDTH: f32 = 2.5;
    pub const ARENA_HALF_HEIGHT: f32 = 2.5;
    /// Collision testing is skipped outside this multiple of the arena
    pub const PHYSICS_BOUNDS_SCALE: f32 = 1.25;

    /// Ball pool size
    pub const BALL_POOL_CAPACITY: usize = 1000;
    /// Fraction of speed kept after each bounce
    pub const BALL_RESTITUTION: f32 = 0.98;
    /// Gravity in arena units per second squared
    pub const GRAVITY: f32 = 3.0;

    /// Fixed physics timestep (250 Hz)
    pub const PHYSICS_TICK_MS: f64 = 4.0;
    /// Catch-up backlog (in ticks) that gets logged; ticks are never dropped
    pub const TICK_BACKLOG_WARN: u32 = 2500;
    /// Collision re-scans allowed per tick before resolution is abandoned
    pub const MAX_COLLISION_RESCANS: u32 = 10;

    /// Ball drop tempo
    pub const BPM_DEFAULT: f32 = 60.0;
    pub const BPM_MIN: f32 = 1.0;
    pub const BPM_MAX: f32 = 240.0;

    /// Guideline preview length
    pub const GUIDELINE_POINT_COUNT: usize = 100_000;

    /// Whole-tone scale bounds (MIDI note numbers)
    pub const TONE_LOW_NOTE: i32 = 36;
    pub const TONE_HIGH_NOTE: i32 = 96;
    /// Playback rate 1.0 corresponds to this note (55 Hz)
    pub const TONE_BASE_NOTE: i32 = 33;

    /// Drop point as a fraction of the arena half-extents
    pub const DROP_POINT_FACTOR: [f32; 2] = [-0.75, 0.75];

    /// Resting brightness of an unlit plane
    pub const PLANE_MIN_BRIGHTNESS: f32 = 0.1;
    /// Plane hit color fade per second
    pub const PLANE_COLOR_DECAY_PER_SECOND: f32 = 3.0;
}

/// Normalize an angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Direction of a vector as an angle in [0, 2π)
#[inline]
pub fn vector_angle(v: Vec2) -> f32 {
    normalize_angle(v.y.atan2(v.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_normalize_angle_shifts_negatives() {
        assert!((normalize_angle(-PI / 2.0) - 3.0 * PI / 2.0).abs() < 1e-6);
        assert_eq!(normalize_angle(0.0), 0.0);
        assert!((normalize_angle(PI) - PI).abs() < 1e-6);
        assert!(normalize_angle(TAU) < 1e-6);
    }

    #[test]
    fn test_vector_angle() {
        assert!((vector_angle(Vec2::new(0.0, -1.0)) - 3.0 * PI / 2.0).abs() < 1e-6);
        assert!((vector_angle(Vec2::new(-1.0, 0.0)) - PI).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn normalize_angle_in_range(theta in -100.0f32..100.0) {
            let n = normalize_angle(theta);
            prop_assert!((0.0..TAU).contains(&n));
        }

        #[test]
        fn normalize_angle_is_congruent(theta in -100.0f32..100.0) {
            let n = normalize_angle(theta);
            let turns = (theta - n) / TAU;
            prop_assert!((turns - turns.round()).abs() < 1e-4);
        }
    }
}
