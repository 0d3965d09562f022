//! Audio data model for the turn pipeline: PCM frames, the utterance
//! frame queue, and WAV container conversion.

mod frame;
mod queue;
pub mod wav;

pub use frame::{AudioFrame, Utterance};
pub use queue::{FrameQueue, FrameReceiver, FrameSender};

/// Sample rate the device transport delivers and the container declares (16 kHz).
pub const SAMPLE_RATE: u32 = 16000;

/// Nominal duration of one device frame.
pub const FRAME_DURATION_MS: u32 = 10;

/// Samples per nominal frame at [`SAMPLE_RATE`].
pub const FRAME_SAMPLES: usize = (SAMPLE_RATE as usize * FRAME_DURATION_MS as usize) / 1000;

/// Bytes per nominal frame (16-bit mono PCM).
pub const FRAME_BYTES: usize = FRAME_SAMPLES * 2;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("wav container error: {0}")]
    Container(#[from] hound::Error),
    #[error("pcm buffer has a truncated sample ({0} bytes)")]
    TruncatedSample(usize),
}

pub type Result<T> = std::result::Result<T, AudioError>;
