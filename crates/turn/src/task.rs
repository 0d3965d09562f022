//! The per-turn task: drain, understand, speak, clean up.

use std::sync::Arc;
use std::time::Duration;

use palaver_audio::wav;
use palaver_events::{EventKind, MediaCommand};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::playback::PlaybackScheduler;
use crate::supervisor::ActiveSlot;
use crate::{Result, TurnDeps, TurnError};

/// Lifecycle phase of a turn, for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Buffering,
    Processing,
    Speaking,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::Idle => "idle",
            TurnState::Buffering => "buffering",
            TurnState::Processing => "processing",
            TurnState::Speaking => "speaking",
        }
    }
}

pub(crate) struct TurnTask {
    id: u64,
    deps: Arc<TurnDeps>,
    cancel: CancellationToken,
    active: ActiveSlot,
}

impl TurnTask {
    pub(crate) fn new(
        id: u64,
        deps: Arc<TurnDeps>,
        cancel: CancellationToken,
        active: ActiveSlot,
    ) -> Self {
        Self {
            id,
            deps,
            cancel,
            active,
        }
    }

    pub(crate) async fn run(self) {
        match self.drive().await {
            Ok(()) => tracing::info!(turn = self.id, "turn completed"),
            Err(TurnError::Cancelled) => tracing::info!(turn = self.id, "turn cancelled"),
            Err(err) => tracing::warn!(turn = self.id, error = %err, "turn failed"),
        }
        self.cleanup();
    }

    fn set_state(&self, state: TurnState) {
        tracing::debug!(turn = self.id, state = state.as_str(), "turn state");
    }

    async fn drive(&self) -> Result<()> {
        self.set_state(TurnState::Buffering);

        // Mark the end of the utterance before draining, so the drain
        // consumes exactly the frames that accumulated up to the
        // endpoint and stops, even while new frames keep arriving.
        self.deps.frames.end_utterance();

        let utterance = {
            let mut receiver = tokio::select! {
                _ = self.cancel.cancelled() => return Err(TurnError::Cancelled),
                guard = self.deps.receiver.lock() => guard,
            };
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(TurnError::Cancelled),
                drained = receiver.drain_utterance() => drained.ok_or(TurnError::QueueClosed)?,
            }
        };

        self.set_state(TurnState::Processing);
        let audio = wav::pcm_to_wav(utterance.pcm())?;

        let text = tokio::select! {
            _ = self.cancel.cancelled() => return Err(TurnError::Cancelled),
            reply = self.deps.workflow.respond(&audio) => reply.map_err(TurnError::Workflow)?,
        };
        tracing::debug!(turn = self.id, reply = %text, "workflow replied");

        let reply = tokio::select! {
            _ = self.cancel.cancelled() => return Err(TurnError::Cancelled),
            spoken = self.deps.synthesizer.synthesize(&text) => {
                spoken.map_err(TurnError::Synthesis)?
            }
        };

        // A backend reporting a NaN, negative, or absurd duration must
        // fail the turn here, before any playback side effects.
        let playback = Duration::try_from_secs_f32(reply.duration_secs)
            .map_err(|err| TurnError::Synthesis(err.into()))?;

        self.set_state(TurnState::Speaking);
        self.deps
            .device
            .send_event(EventKind::TtsStreamStart, json!({}))?;
        self.deps.device.play_media(&MediaCommand {
            player_id: self.deps.media_player_id,
            media_url: reply.media_url.clone(),
            announcement: true,
        })?;

        PlaybackScheduler::await_playback(playback, &self.cancel).await?;

        self.deps
            .device
            .send_event(EventKind::TtsStreamEnd, json!({}))?;
        Ok(())
    }

    /// Runs on every exit path: terminal event, classifier reset, and
    /// handle clear (only if the slot still holds this turn).
    fn cleanup(&self) {
        self.set_state(TurnState::Idle);

        if let Err(err) = self.deps.device.send_event(EventKind::RunEnd, json!({})) {
            tracing::warn!(turn = self.id, error = %err, "terminal event not delivered");
        }

        self.deps
            .endpointer
            .lock()
            .expect("endpointer mutex poisoned")
            .reset();

        let mut active = self.active.lock().expect("active turn mutex poisoned");
        if active.as_ref().is_some_and(|turn| turn.id == self.id) {
            *active = None;
        }
    }
}
