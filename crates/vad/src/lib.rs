//! Voice-activity scoring and utterance endpoint detection.
//!
//! A [`VoiceClassifier`] turns one 10 ms frame at a time into a
//! [`VadScore`]; the [`Endpointer`] applies the decision table that
//! drives turn starts.

mod endpoint;
mod energy;

pub use endpoint::{Endpointer, FrameDecision, SPEECH_THRESHOLD};
pub use energy::EnergyClassifier;

use palaver_audio::AudioFrame;

/// Speech probability for one frame.
///
/// Negative means the classifier has not seen enough context yet;
/// non-negative scores are probabilities in `0.0..=1.0`, where values
/// above [`SPEECH_THRESHOLD`] mean speech and values at or below it
/// mean silence.
pub type VadScore = f32;

/// Frame-synchronous voice-activity classifier.
///
/// Implementations are stateful across frames; that state must never
/// leak between turns, so `reset` restores the freshly-constructed
/// state and is called at every turn boundary and cancellation.
pub trait VoiceClassifier: Send {
    fn score_frame(&mut self, frame: &AudioFrame) -> VadScore;
    fn reset(&mut self);
}
