//! Collision sounds
//!
//! Each bounce may ring the ball's voice at the struck plane's pitch. Playback
//! itself belongs to the host, reached through [`ToneSink`]; this module only
//! decides whether a bounce is audible and how loud it is.

use crate::sim::{CollisionEvent, VoiceId};

/// Bounces flatter than this (radians) are silent
pub const MIN_AUDIBLE_BOUNCE_ANGLE: f32 = 0.1;

/// Scales |bounce angle| * speed into a volume
const VOLUME_SCALE: f32 = 10.0;

/// A request to play the shared tone sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneTrigger {
    pub voice: VoiceId,
    /// Sample playback-rate multiplier (from the plane's length)
    pub playback_rate: f32,
    /// Linear gain for the voice
    pub amplitude: f32,
}

/// What a single bounce does to sound and light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResponse {
    pub tone: ToneTrigger,
    /// Perceptual loudness in [0, 1]
    pub volume: f32,
    /// How strongly the ball's color lights up the plane
    pub flash_strength: f32,
}

impl CollisionResponse {
    /// Response to a bounce, or `None` for a near-tangent graze
    pub fn for_bounce(event: &CollisionEvent, playback_rate: f32, voice: VoiceId) -> Option<Self> {
        let bounce = event.bounce_angle.abs();
        if bounce < MIN_AUDIBLE_BOUNCE_ANGLE {
            return None;
        }

        let volume = (bounce * event.speed * VOLUME_SCALE).min(1.0);
        Some(Self {
            tone: ToneTrigger {
                voice,
                playback_rate,
                amplitude: 2f32.powf(volume) - 1.0,
            },
            volume,
            flash_strength: flash_curve(flash_curve(volume)),
        })
    }
}

/// Log curve that lifts quiet hits so they still flash visibly
#[inline]
fn flash_curve(x: f32) -> f32 {
    (x + 0.01).ln() / 100f32.ln() + 1.0
}

/// Host-side tone playback
pub trait ToneSink {
    fn play(&mut self, tone: &ToneTrigger);
}

/// Sink that only logs; used by the headless driver
#[derive(Debug, Default)]
pub struct LogToneSink {
    pub played: u64,
}

impl ToneSink for LogToneSink {
    fn play(&mut self, tone: &ToneTrigger) {
        self.played += 1;
        log::trace!(
            "tone voice={} rate={:.3} amp={:.3}",
            tone.voice,
            tone.playback_rate,
            tone.amplitude
        );
    }
}

/// Master gain stage between the simulation and the sink
#[derive(Debug, Clone)]
pub struct AudioManager {
    master_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            muted: false,
        }
    }
}

impl AudioManager {
    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Forward a tone to the sink at the master level
    pub fn play(&self, tone: &ToneTrigger, sink: &mut dyn ToneSink) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        sink.play(&ToneTrigger {
            amplitude: tone.amplitude * vol,
            ..*tone
        });
    }
}
