//! Protocol events and the device-control seam.
//!
//! The remote device runs its own state machine keyed off a fixed
//! event order; this crate defines those events, the playback command,
//! and the `DeviceControl` trait the turn pipeline emits through.
//! An in-memory implementation captures ordered traffic for tests.

mod control;

pub use control::{DeviceControl, DeviceControlRef, DeviceMessage, InMemoryDeviceControl};

use serde::{Deserialize, Serialize};

/// Outbound protocol events, in the order a successful turn emits them.
///
/// `RunEnd` is terminal and is emitted on every exit path, including
/// failure and cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    RunStart,
    SttVadStart,
    SttVadEnd,
    TtsStreamStart,
    TtsStreamEnd,
    RunEnd,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::RunStart => "RUN_START",
            EventKind::SttVadStart => "STT_VAD_START",
            EventKind::SttVadEnd => "STT_VAD_END",
            EventKind::TtsStreamStart => "TTS_STREAM_START",
            EventKind::TtsStreamEnd => "TTS_STREAM_END",
            EventKind::RunEnd => "RUN_END",
        }
    }
}

/// Playback command addressed to the device's logical media player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCommand {
    /// Fixed logical media-player identifier on the device.
    pub player_id: u32,
    /// URL of the synthesized audio artifact.
    pub media_url: String,
    /// Play as an announcement (ducks other playback).
    pub announcement: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("device transport closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, EmitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_identifiers() {
        assert_eq!(EventKind::RunStart.as_str(), "RUN_START");
        assert_eq!(EventKind::SttVadEnd.as_str(), "STT_VAD_END");
        assert_eq!(EventKind::TtsStreamEnd.as_str(), "TTS_STREAM_END");
    }

    #[test]
    fn test_event_serializes_to_wire_identifier() {
        let json = serde_json::to_string(&EventKind::TtsStreamStart).unwrap();
        assert_eq!(json, "\"TTS_STREAM_START\"");
        let back: EventKind = serde_json::from_str("\"RUN_END\"").unwrap();
        assert_eq!(back, EventKind::RunEnd);
    }

    #[test]
    fn test_media_command_round_trip() {
        let command = MediaCommand {
            player_id: 2232357057,
            media_url: "http://host:8080/audio/reply.wav".into(),
            announcement: true,
        };
        let json = serde_json::to_string(&command).unwrap();
        let back: MediaCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, command);
    }
}
