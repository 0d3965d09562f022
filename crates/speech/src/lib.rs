//! HTTP-backed understanding and synthesis.
//!
//! Both backends are opaque web services: the workflow takes the
//! utterance as a WAV body and answers with reply text, the synthesizer
//! takes text and answers with WAV audio. Synthesized audio is staged
//! in a local artifact directory the device fetches from over HTTP.

mod artifact;
mod http;

pub use artifact::ArtifactStore;
pub use http::{HttpSynthesizer, HttpWorkflow};

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend answered {0}")]
    Status(reqwest::StatusCode),
    #[error("artifact not written: {0}")]
    Io(#[from] std::io::Error),
    #[error("synthesized container: {0}")]
    Container(#[from] palaver_audio::AudioError),
}

pub type Result<T> = std::result::Result<T, SpeechError>;
