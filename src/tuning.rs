//! Tuning table: plane length to playback rate
//!
//! Shorter planes ring higher. Lengths are mapped onto a whole-tone scale and
//! the chosen note is returned as a ratio against a base note, for use as a
//! sample playback-rate multiplier.

use crate::settings::Settings;

/// Ascending whole-tone scale used to quantize plane lengths
#[derive(Debug, Clone)]
pub struct ToneScale {
    notes: Vec<i32>,
    base_note: i32,
    max_length: f32,
}

impl ToneScale {
    /// Whole-tone scale from `low_note` to `high_note` inclusive
    pub fn whole_tone(low_note: i32, high_note: i32, base_note: i32, max_length: f32) -> Self {
        let mut notes: Vec<i32> = (low_note..=high_note).step_by(2).collect();
        if notes.is_empty() {
            notes.push(low_note);
        }
        Self {
            notes,
            base_note,
            max_length,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::whole_tone(
            settings.tone_low_note,
            settings.tone_high_note,
            settings.tone_base_note,
            settings.max_plane_length(),
        )
    }

    pub fn notes(&self) -> &[i32] {
        &self.notes
    }

    /// Note index for a plane length (0 = longest plane, lowest note)
    pub fn note_index(&self, length: f32) -> usize {
        let last = self.notes.len() - 1;
        let t = (1.0 - length / self.max_length).clamp(0.0, 1.0);
        ((t * last as f32).round() as usize).min(last)
    }

    /// Playback-rate multiplier for a plane of the given length
    pub fn frequency_from_length(&self, length: f32) -> f32 {
        let note = self.notes[self.note_index(length)];
        2f32.powf((note - self.base_note) as f32 / 12.0)
    }
}

impl Default for ToneScale {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_tone_notes() {
        let scale = ToneScale::whole_tone(36, 96, 33, 1.0);
        assert_eq!(scale.notes().len(), 31);
        assert_eq!(scale.notes()[0], 36);
        assert_eq!(scale.notes()[30], 96);
        assert!(scale.notes().windows(2).all(|w| w[1] - w[0] == 2));
    }

    #[test]
    fn test_longest_plane_is_lowest_note() {
        let scale = ToneScale::default();
        let rate = scale.frequency_from_length(Settings::default().max_plane_length());
        // note 36 against base 33 is three semitones up
        assert!((rate - 2f32.powf(3.0 / 12.0)).abs() < 1e-5);
    }

    #[test]
    fn test_zero_length_is_highest_note() {
        let scale = ToneScale::default();
        assert_eq!(scale.note_index(0.0), 30);
        let rate = scale.frequency_from_length(0.0);
        assert!((rate - 2f32.powf(63.0 / 12.0)).abs() < 1e-2);
    }

    #[test]
    fn test_shorter_is_never_lower() {
        let scale = ToneScale::default();
        let mut previous = 0.0;
        for i in (0..=70).rev() {
            let rate = scale.frequency_from_length(i as f32 * 0.1);
            assert!(rate >= previous);
            previous = rate;
        }
    }

    #[test]
    fn test_base_note_is_unity() {
        let scale = ToneScale::whole_tone(33, 33, 33, 5.0);
        assert_eq!(scale.frequency_from_length(2.0), 1.0);
    }
}
