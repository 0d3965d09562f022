//! Timed playback wait.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{Result, TurnError};

/// Substitutes for a playback-completion acknowledgement.
///
/// The device protocol has no true "playback finished" signal, so the
/// turn suspends for the synthesized artifact's exact duration before
/// emitting the stream-end event. Correctness depends on that duration
/// matching the artifact reasonably closely.
pub struct PlaybackScheduler;

impl PlaybackScheduler {
    /// Suspend for `duration`, or return [`TurnError::Cancelled`] as
    /// soon as cancellation is requested.
    pub async fn await_playback(duration: Duration, cancel: &CancellationToken) -> Result<()> {
        tracing::debug!(duration_secs = duration.as_secs_f32(), "awaiting playback");
        tokio::select! {
            _ = cancel.cancelled() => Err(TurnError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}
