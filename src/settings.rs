//! Simulation settings
//!
//! Every tunable constant lives here so hosts can override them from JSON.
//! Defaults come from [`crate::consts`].

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// All externally tunable simulation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    /// Half-width of the visible arena
    pub arena_half_width: f32,
    /// Half-height of the visible arena
    pub arena_half_height: f32,
    /// Collision testing happens only inside this multiple of the arena
    pub physics_bounds_scale: f32,
    /// Drop point as a fraction of the half-extents
    pub drop_point_factor: [f32; 2],

    // === Physics ===
    /// Number of pooled balls
    pub ball_pool_capacity: usize,
    /// Fraction of speed kept per bounce, in (0, 1]
    pub restitution: f32,
    /// Gravity (arena units / s²)
    pub gravity: f32,
    /// Fixed physics tick duration in milliseconds
    pub tick_ms: f64,
    /// Heuristic cap on collision re-scans within one tick
    pub max_collision_rescans: u32,

    // === Tempo ===
    pub bpm_default: f32,
    pub bpm_min: f32,
    pub bpm_max: f32,

    // === Guideline ===
    /// Number of points in the preview path
    pub guideline_capacity: usize,

    // === Tuning ===
    pub tone_low_note: i32,
    pub tone_high_note: i32,
    pub tone_base_note: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_half_width: ARENA_HALF_WIDTH,
            arena_half_height: ARENA_HALF_HEIGHT,
            physics_bounds_scale: PHYSICS_BOUNDS_SCALE,
            drop_point_factor: DROP_POINT_FACTOR,

            ball_pool_capacity: BALL_POOL_CAPACITY,
            restitution: BALL_RESTITUTION,
            gravity: GRAVITY,
            tick_ms: PHYSICS_TICK_MS,
            max_collision_rescans: MAX_COLLISION_RESCANS,

            bpm_default: BPM_DEFAULT,
            bpm_min: BPM_MIN,
            bpm_max: BPM_MAX,

            guideline_capacity: GUIDELINE_POINT_COUNT,

            tone_low_note: TONE_LOW_NOTE,
            tone_high_note: TONE_HIGH_NOTE,
            tone_base_note: TONE_BASE_NOTE,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Invalid settings in {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not read {}: {}", path.display(), e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings as JSON
    pub fn save(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match self.to_json() {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => log::info!("Settings saved to {}", path.display()),
                Err(e) => log::warn!("Could not write {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not serialize settings: {}", e),
        }
    }

    /// Clamp values that would break the simulation
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.ball_pool_capacity == 0 {
            log::warn!("ball_pool_capacity must be at least 1");
            self.ball_pool_capacity = 1;
        }
        if !(self.restitution > 0.0 && self.restitution <= 1.0) {
            log::warn!("restitution {} outside (0, 1], using default", self.restitution);
            self.restitution = defaults.restitution;
        }
        if !(self.tick_ms > 0.0 && self.tick_ms.is_finite()) {
            log::warn!("tick_ms {} must be positive and finite, using default", self.tick_ms);
            self.tick_ms = defaults.tick_ms;
        }
        if !self.gravity.is_finite() {
            log::warn!("gravity must be finite, using default");
            self.gravity = defaults.gravity;
        }
        if !(self.arena_half_width > 0.0
            && self.arena_half_height > 0.0
            && self.arena_half_width.is_finite()
            && self.arena_half_height.is_finite())
        {
            log::warn!("arena half-extents must be positive, using defaults");
            self.arena_half_width = defaults.arena_half_width;
            self.arena_half_height = defaults.arena_half_height;
        }
        if !(self.physics_bounds_scale > 0.0 && self.physics_bounds_scale.is_finite()) {
            log::warn!("physics_bounds_scale must be positive, using default");
            self.physics_bounds_scale = defaults.physics_bounds_scale;
        }
        if !self.drop_point_factor.iter().all(|f| f.is_finite()) {
            log::warn!("drop_point_factor must be finite, using default");
            self.drop_point_factor = defaults.drop_point_factor;
        }
        if self.guideline_capacity == 0 {
            log::warn!("guideline_capacity must be at least 1");
            self.guideline_capacity = 1;
        }
        if !(self.bpm_min > 0.0 && self.bpm_min.is_finite()) {
            log::warn!("bpm_min {} must be positive and finite, using default", self.bpm_min);
            self.bpm_min = defaults.bpm_min;
        }
        if !(self.bpm_max > 0.0 && self.bpm_max.is_finite()) {
            log::warn!("bpm_max {} must be positive and finite, using default", self.bpm_max);
            self.bpm_max = defaults.bpm_max;
        }
        if self.bpm_min > self.bpm_max {
            log::warn!("bpm_min {} > bpm_max {}, swapping", self.bpm_min, self.bpm_max);
            std::mem::swap(&mut self.bpm_min, &mut self.bpm_max);
        }
        if self.tone_low_note > self.tone_high_note {
            log::warn!("tone_low_note > tone_high_note, swapping");
            std::mem::swap(&mut self.tone_low_note, &mut self.tone_high_note);
        }
        self
    }

    /// Visible arena half-extents
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.arena_half_width, self.arena_half_height)
    }

    /// Half-extents of the region where collisions are tested
    #[inline]
    pub fn physics_half_extents(&self) -> Vec2 {
        self.half_extents() * self.physics_bounds_scale
    }

    /// Canonical drop point
    #[inline]
    pub fn drop_point(&self) -> Vec2 {
        Vec2::from(self.drop_point_factor) * self.half_extents()
    }

    /// Tick duration in seconds
    #[inline]
    pub fn tick_seconds(&self) -> f32 {
        (self.tick_ms / 1000.0) as f32
    }

    /// Velocity change per tick due to gravity (velocity is stored per tick)
    #[inline]
    pub fn gravity_per_tick(&self) -> f32 {
        let t = self.tick_seconds();
        self.gravity * t * t
    }

    /// Longest drawable plane (the arena diagonal)
    #[inline]
    pub fn max_plane_length(&self) -> f32 {
        (self.half_extents() * 2.0).length()
    }

    /// Clamp a point into the visible arena
    #[inline]
    pub fn clamp_to_arena(&self, point: Vec2) -> Vec2 {
        let half = self.half_extents();
        point.clamp(-half, half)
    }
}
