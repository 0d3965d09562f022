//! HTTP clients for the understanding workflow and the synthesizer.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use palaver_audio::wav;
use palaver_turn::{BoxError, ResponseWorkflow, SpokenReply, Synthesizer};

use crate::{ArtifactStore, Result, SpeechError};

/// Staged replies kept on disk; older ones are pruned after each turn.
const ARTIFACT_WINDOW: u64 = 2;

/// Understanding backend: POSTs the utterance WAV, reads reply text.
pub struct HttpWorkflow {
    client: reqwest::Client,
    url: String,
}

impl HttpWorkflow {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn respond_inner(&self, audio: &[u8]) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(audio.to_vec())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Status(status));
        }
        let text = response.text().await?;
        tracing::debug!(chars = text.len(), "workflow reply received");
        Ok(text)
    }
}

#[async_trait]
impl ResponseWorkflow for HttpWorkflow {
    async fn respond(&self, audio: &[u8]) -> std::result::Result<String, BoxError> {
        Ok(self.respond_inner(audio).await?)
    }
}

/// Synthesis backend: POSTs reply text, stages the returned WAV as a
/// fetchable artifact, and reads the exact duration off the container.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    url: String,
    artifacts: ArtifactStore,
    serial: AtomicU64,
}

impl HttpSynthesizer {
    pub fn new(client: reqwest::Client, url: impl Into<String>, artifacts: ArtifactStore) -> Self {
        Self {
            client,
            url: url.into(),
            artifacts,
            serial: AtomicU64::new(0),
        }
    }

    async fn synthesize_inner(&self, text: &str) -> Result<SpokenReply> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(text.to_string())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Status(status));
        }
        let audio = response.bytes().await?;
        self.stage_reply(&audio).await
    }

    /// Stage a synthesized container as the next numbered artifact and
    /// prune the one that fell out of the retention window.
    ///
    /// Serial-numbered names so a reply the device is still fetching is
    /// never overwritten by the next turn's artifact; keeping only the
    /// last [`ARTIFACT_WINDOW`] keeps the directory from growing for
    /// the life of the server.
    async fn stage_reply(&self, audio: &[u8]) -> Result<SpokenReply> {
        let duration_secs = wav::wav_duration_secs(audio)?;

        let serial = self.serial.fetch_add(1, Ordering::Relaxed);
        let media_url = self
            .artifacts
            .store(&format!("reply-{serial}.wav"), audio)
            .await?;
        if let Some(stale) = serial.checked_sub(ARTIFACT_WINDOW) {
            self.artifacts.remove(&format!("reply-{stale}.wav")).await;
        }
        tracing::info!(%media_url, duration_secs, "reply synthesized");

        Ok(SpokenReply {
            media_url,
            duration_secs,
        })
    }
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str) -> std::result::Result<SpokenReply, BoxError> {
        Ok(self.synthesize_inner(text).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_audio::wav::pcm_to_wav;

    fn synthesizer(dir: &std::path::Path) -> HttpSynthesizer {
        HttpSynthesizer::new(
            reqwest::Client::new(),
            "http://unused.invalid/tts",
            ArtifactStore::new(dir, "http://host/audio"),
        )
    }

    #[tokio::test]
    async fn test_staged_replies_rotate_old_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let synth = synthesizer(tmp.path());
        // 0.1 s of silence in a container.
        let audio = pcm_to_wav(&vec![0u8; 3200]).unwrap();

        for _ in 0..4 {
            synth.stage_reply(&audio).await.unwrap();
        }

        let mut names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["reply-2.wav", "reply-3.wav"]);
    }

    #[tokio::test]
    async fn test_staged_reply_reports_container_duration() {
        let tmp = tempfile::tempdir().unwrap();
        let synth = synthesizer(tmp.path());
        let audio = pcm_to_wav(&vec![0u8; 3200]).unwrap();

        let reply = synth.stage_reply(&audio).await.unwrap();
        assert_eq!(reply.media_url, "http://host/audio/reply-0.wav");
        assert!((reply.duration_secs - 0.1).abs() < f32::EPSILON);
    }
}
