//! Frame-time scheduling
//!
//! Render frames arrive at whatever rate the host manages. Physics runs at a
//! fixed tick, and balls are released on a tempo; both are driven by
//! accumulating frame deltas.

use serde::{Deserialize, Serialize};

use crate::consts::{BPM_MAX, BPM_MIN, PHYSICS_TICK_MS, TICK_BACKLOG_WARN};
use crate::settings::Settings;

/// Frame deltas that are negative, NaN or infinite advance nothing
#[inline]
fn usable_delta(delta_ms: f64) -> f64 {
    if delta_ms.is_finite() {
        delta_ms.max(0.0)
    } else {
        log::warn!("Ignoring non-finite frame delta {}", delta_ms);
        0.0
    }
}

/// Accumulates frame time into whole fixed ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedStep {
    tick_ms: f64,
    remainder_ms: f64,
}

impl FixedStep {
    /// A tick that is not positive and finite falls back to the default
    pub fn new(tick_ms: f64) -> Self {
        let tick_ms = if tick_ms > 0.0 && tick_ms.is_finite() {
            tick_ms
        } else {
            log::warn!("Invalid tick length {} ms, using {} ms", tick_ms, PHYSICS_TICK_MS);
            PHYSICS_TICK_MS
        };
        Self {
            tick_ms,
            remainder_ms: 0.0,
        }
    }

    #[inline]
    pub fn tick_ms(&self) -> f64 {
        self.tick_ms
    }

    /// Time carried over to the next frame
    #[inline]
    pub fn remainder_ms(&self) -> f64 {
        self.remainder_ms
    }

    /// Add a frame delta; returns how many ticks are now due
    pub fn advance(&mut self, delta_ms: f64) -> u32 {
        self.remainder_ms += usable_delta(delta_ms);
        let backlog = self.remainder_ms / self.tick_ms;
        if backlog > TICK_BACKLOG_WARN as f64 {
            log::warn!("Catching up {:.0} ticks in one frame", backlog);
        }
        let mut ticks = 0;
        while self.remainder_ms > self.tick_ms {
            self.remainder_ms -= self.tick_ms;
            ticks += 1;
        }
        ticks
    }

    pub fn reset(&mut self) {
        self.remainder_ms = 0.0;
    }
}

/// Beats-per-minute setting with its drop period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tempo {
    bpm: f32,
    min: f32,
    max: f32,
    period_ms: f64,
}

impl Tempo {
    /// Bounds that are not positive and finite take the defaults; reversed bounds are swapped
    pub fn new(bpm: f32, min: f32, max: f32) -> Self {
        let valid = |b: f32| b > 0.0 && b.is_finite();
        let min = if valid(min) { min } else { BPM_MIN };
        let max = if valid(max) { max } else { BPM_MAX };
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let mut tempo = Self {
            bpm: min,
            min,
            max,
            period_ms: 0.0,
        };
        tempo.set_bpm(bpm);
        tempo
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.bpm_default, settings.bpm_min, settings.bpm_max)
    }

    /// Set the tempo, clamped to the configured range
    pub fn set_bpm(&mut self, bpm: f32) {
        let bpm = if bpm.is_nan() { self.min } else { bpm };
        self.bpm = bpm.clamp(self.min, self.max);
        self.period_ms = 60_000.0 / self.bpm as f64;
        log::debug!("Tempo {} bpm ({} ms per drop)", self.bpm, self.period_ms);
    }

    #[inline]
    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Milliseconds between drops
    #[inline]
    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }
}

/// Accumulates frame time against the tempo period
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DropTimer {
    elapsed_ms: f64,
}

impl DropTimer {
    /// Add a frame delta; returns true when a ball should drop this frame
    ///
    /// At most one drop fires per frame; surplus time carries over.
    pub fn advance(&mut self, delta_ms: f64, tempo: &Tempo) -> bool {
        self.elapsed_ms += usable_delta(delta_ms);
        if self.elapsed_ms > tempo.period_ms() {
            self.elapsed_ms -= tempo.period_ms();
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }
}

/// Everything time-related the frame loop owns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    pub step: FixedStep,
    pub tempo: Tempo,
    pub drop_timer: DropTimer,
}

/// Work a frame must perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramePlan {
    pub drop_ball: bool,
    pub ticks: u32,
}

impl Scheduler {
    pub fn new(settings: &Settings) -> Self {
        Self {
            step: FixedStep::new(settings.tick_ms),
            tempo: Tempo::from_settings(settings),
            drop_timer: DropTimer::default(),
        }
    }

    /// Advance both clocks by one frame delta
    pub fn advance(&mut self, delta_ms: f64) -> FramePlan {
        FramePlan {
            drop_ball: self.drop_timer.advance(delta_ms, &self.tempo),
            ticks: self.step.advance(delta_ms),
        }
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        self.tempo.set_bpm(bpm);
    }

    /// Clear accumulated time; the tempo is kept
    pub fn reset(&mut self) {
        self.step.reset();
        self.drop_timer.reset();
    }
}
