//! Turn orchestration: the endpointing-driven state machine that runs
//! one conversational turn at a time.
//!
//! A turn drains the buffered utterance, hands it to the understanding
//! workflow, synthesizes the reply, and drives device playback through
//! a strictly ordered event sequence. Exactly one turn task may be
//! live per device; a start while one is live is a no-op, a stop
//! cancels it, and cleanup (terminal event, classifier reset, handle
//! clear) runs on every exit path.

mod control;
mod playback;
mod supervisor;
mod task;

pub use control::{ControlEvent, ControlLoop};
pub use playback::PlaybackScheduler;
pub use supervisor::TurnSupervisor;
pub use task::TurnState;

use std::sync::Arc;

use async_trait::async_trait;
use palaver_audio::{FrameReceiver, FrameSender};
use palaver_events::DeviceControlRef;
use palaver_vad::Endpointer;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("utterance container: {0}")]
    Container(#[from] palaver_audio::AudioError),
    #[error("workflow call failed: {0}")]
    Workflow(#[source] BoxError),
    #[error("synthesis failed: {0}")]
    Synthesis(#[source] BoxError),
    #[error("device transport: {0}")]
    Transport(#[from] palaver_events::EmitError),
    #[error("frame queue closed")]
    QueueClosed,
    #[error("turn cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, TurnError>;

/// Opaque understanding/response workflow: WAV-container bytes in,
/// reply text out.
#[async_trait]
pub trait ResponseWorkflow: Send + Sync {
    async fn respond(&self, wav: &[u8]) -> std::result::Result<String, BoxError>;
}

/// Opaque speech synthesizer: reply text in, retrievable artifact and
/// its exact duration out.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> std::result::Result<SpokenReply, BoxError>;
}

/// A synthesized reply ready for device playback.
#[derive(Debug, Clone)]
pub struct SpokenReply {
    /// URL the device can fetch the artifact from.
    pub media_url: String,
    /// Exact audio duration in seconds (frame count / sample rate).
    pub duration_secs: f32,
}

/// Shared collaborators for one device session.
///
/// Owned behind an `Arc` by the supervisor, the control loop, and each
/// spawned turn task.
pub struct TurnDeps {
    /// Ingest half of the frame queue (sentinel pushes).
    pub frames: FrameSender,
    /// Consumer half; locked by the active turn while buffering only.
    pub receiver: tokio::sync::Mutex<FrameReceiver>,
    pub device: DeviceControlRef,
    pub workflow: Arc<dyn ResponseWorkflow>,
    pub synthesizer: Arc<dyn Synthesizer>,
    /// Cross-frame voice-activity state; reset at every turn boundary.
    pub endpointer: std::sync::Mutex<Endpointer>,
    /// Fixed logical media-player identifier on the device.
    pub media_player_id: u32,
}
