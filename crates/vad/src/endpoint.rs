//! Endpoint decision table over classifier scores.

use palaver_audio::AudioFrame;

use crate::VoiceClassifier;

/// Score above which a frame counts as speech; at or below, silence.
pub const SPEECH_THRESHOLD: f32 = 0.5;

/// Per-frame classification driving the turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDecision {
    /// Classifier still warming up; only queue the frame.
    MoreContextNeeded,
    /// Speaker still talking.
    SpeechContinuing,
    /// Silence after valid context: the utterance has ended.
    EndpointReached,
}

/// Applies the endpoint decision table frame by frame.
///
/// Owns the classifier's cross-frame state; `reset` swaps in fresh
/// state so no voice-activity context leaks into the next turn.
pub struct Endpointer {
    classifier: Box<dyn VoiceClassifier>,
    threshold: f32,
}

impl Endpointer {
    pub fn new(classifier: impl VoiceClassifier + 'static) -> Self {
        Self {
            classifier: Box::new(classifier),
            threshold: SPEECH_THRESHOLD,
        }
    }

    /// Classify one frame in arrival order. The caller queues the
    /// frame afterwards regardless of the decision, so the triggering
    /// frame is part of the utterance it ends.
    pub fn classify(&mut self, frame: &AudioFrame) -> FrameDecision {
        let score = self.classifier.score_frame(frame);
        let decision = if score < 0.0 {
            FrameDecision::MoreContextNeeded
        } else if score > self.threshold {
            FrameDecision::SpeechContinuing
        } else {
            FrameDecision::EndpointReached
        };
        tracing::trace!(score, ?decision, "frame classified");
        decision
    }

    /// Restore initial classifier state for the next turn.
    pub fn reset(&mut self) {
        self.classifier.reset();
        tracing::debug!("endpointer reset");
    }
}
