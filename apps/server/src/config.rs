//! Environment-driven server settings.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

/// Logical media player addressed by playback commands. Fixed per
/// device firmware build.
const DEFAULT_MEDIA_PLAYER_ID: u32 = 2_232_357_057;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the WebSocket and artifact server binds to.
    pub bind_addr: SocketAddr,
    /// Understanding workflow endpoint (WAV in, reply text out).
    pub workflow_url: String,
    /// Synthesis endpoint (text in, WAV out).
    pub tts_url: String,
    /// Public base URL devices fetch synthesized artifacts from.
    pub media_base_url: String,
    /// Directory synthesized artifacts are staged in and served from.
    pub artifact_dir: PathBuf,
    pub media_player_id: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env_or("PALAVER_BIND_ADDR", "0.0.0.0:8080")
            .parse()
            .context("PALAVER_BIND_ADDR is not a valid socket address")?;
        let workflow_url =
            std::env::var("PALAVER_WORKFLOW_URL").context("PALAVER_WORKFLOW_URL is required")?;
        let tts_url = std::env::var("PALAVER_TTS_URL").context("PALAVER_TTS_URL is required")?;
        let media_base_url = env_or("PALAVER_MEDIA_BASE_URL", "http://127.0.0.1:8080/audio");
        let artifact_dir = PathBuf::from(env_or("PALAVER_ARTIFACT_DIR", "./artifacts"));
        let media_player_id = match std::env::var("PALAVER_MEDIA_PLAYER_ID") {
            Ok(raw) => raw
                .parse()
                .context("PALAVER_MEDIA_PLAYER_ID is not a number")?,
            Err(_) => DEFAULT_MEDIA_PLAYER_ID,
        };

        Ok(Self {
            bind_addr,
            workflow_url,
            tts_url,
            media_base_url,
            artifact_dir,
            media_player_id,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
