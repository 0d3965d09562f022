//! Energy-based voice-activity classifier.
//!
//! Scores frames by RMS energy against an adaptive noise floor. The
//! first [`WARMUP_FRAMES`] frames only feed the floor estimate and
//! score negative ("need more audio"); after that each frame yields a
//! smoothed speech probability.

use palaver_audio::AudioFrame;

use crate::{VadScore, VoiceClassifier};

/// Frames consumed before the classifier produces valid scores.
pub const WARMUP_FRAMES: u32 = 10;

/// Floor below which RMS estimates are not allowed to collapse.
const MIN_NOISE_FLOOR: f32 = 1e-4;

/// Adaptation rate of the noise floor during non-speech frames.
const FLOOR_ADAPT: f32 = 0.05;

/// Smoothing factor for the emitted probability (higher = faster).
const SCORE_SMOOTHING: f32 = 0.4;

/// RMS multiple of the noise floor at which the raw score reaches 0.5.
const SPEECH_ONSET_RATIO: f32 = 3.0;

pub struct EnergyClassifier {
    warmup_remaining: u32,
    noise_floor: f32,
    smoothed: f32,
}

impl EnergyClassifier {
    pub fn new() -> Self {
        Self {
            warmup_remaining: WARMUP_FRAMES,
            noise_floor: MIN_NOISE_FLOOR,
            smoothed: 0.0,
        }
    }

    fn rms(frame: &AudioFrame) -> f32 {
        let count = frame.sample_count();
        if count == 0 {
            return 0.0;
        }
        let sum_sq: f32 = frame
            .samples()
            .map(|s| {
                let x = s as f32 / 32768.0;
                x * x
            })
            .sum();
        (sum_sq / count as f32).sqrt()
    }
}

impl Default for EnergyClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceClassifier for EnergyClassifier {
    fn score_frame(&mut self, frame: &AudioFrame) -> VadScore {
        let rms = Self::rms(frame);

        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            // Seed the floor from the quietest warm-up frames.
            self.noise_floor = self.noise_floor.max(MIN_NOISE_FLOOR);
            self.noise_floor = self.noise_floor * (1.0 - FLOOR_ADAPT) + rms * FLOOR_ADAPT;
            return -1.0;
        }

        // Raw probability from the RMS-to-floor ratio: 0.5 at the
        // onset ratio, saturating at twice that.
        let ratio = rms / self.noise_floor.max(MIN_NOISE_FLOOR);
        let raw = (ratio / (2.0 * SPEECH_ONSET_RATIO)).clamp(0.0, 1.0);
        self.smoothed = self.smoothed * (1.0 - SCORE_SMOOTHING) + raw * SCORE_SMOOTHING;

        // Track the floor only while not speaking, so sustained speech
        // does not get absorbed into it.
        if raw < 0.5 {
            self.noise_floor = self.noise_floor * (1.0 - FLOOR_ADAPT) + rms * FLOOR_ADAPT;
        }

        self.smoothed
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
