use std::sync::Arc;

use crate::SAMPLE_RATE;

/// One fixed-duration buffer of 16-bit little-endian mono PCM.
///
/// Frames are immutable and cheap to clone (shared ownership). A
/// zero-length frame is the end-of-utterance sentinel.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pcm: Arc<[u8]>,
}

impl AudioFrame {
    pub fn new(pcm: impl Into<Arc<[u8]>>) -> Self {
        Self { pcm: pcm.into() }
    }

    /// The distinguished empty frame marking end of utterance.
    pub fn sentinel() -> Self {
        Self { pcm: Arc::from([]) }
    }

    pub fn is_sentinel(&self) -> bool {
        self.pcm.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.pcm
    }

    pub fn len(&self) -> usize {
        self.pcm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }

    /// Number of whole 16-bit samples in this frame.
    pub fn sample_count(&self) -> usize {
        self.pcm.len() / 2
    }

    /// Duration of this frame in milliseconds at the pipeline sample rate.
    pub fn duration_ms(&self) -> u64 {
        (self.sample_count() as u64 * 1000) / SAMPLE_RATE as u64
    }

    /// Iterate the frame as signed 16-bit little-endian samples.
    ///
    /// A trailing odd byte, which a well-formed transport never sends,
    /// is ignored.
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.pcm
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }
}

/// The ordered PCM accumulated between endpoint-start and endpoint-end.
///
/// Owned exclusively by the turn task that drains it; dropped once the
/// turn converts it to a WAV container.
#[derive(Debug, Default)]
pub struct Utterance {
    pcm: Vec<u8>,
    frame_count: usize,
}

impl Utterance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame's bytes, preserving arrival order.
    pub fn push_frame(&mut self, frame: &AudioFrame) {
        self.pcm.extend_from_slice(frame.bytes());
        self.frame_count += 1;
    }

    pub fn pcm(&self) -> &[u8] {
        &self.pcm
    }

    pub fn into_pcm(self) -> Vec<u8> {
        self.pcm
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        ((self.pcm.len() / 2) as u64 * 1000) / SAMPLE_RATE as u64
    }
}
