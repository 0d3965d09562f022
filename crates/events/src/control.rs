//! Device-control abstraction for decoupled event emission.
//!
//! The turn pipeline talks to the remote device only through this
//! trait, so the core logic can be tested without a live transport.

use std::sync::{Arc, Mutex};

use crate::{EventKind, MediaCommand, Result};

/// Trait for sending protocol events and playback commands to the
/// remote device.
///
/// Both operations are synchronous fire-and-forget: no retries, no
/// acknowledgement tracking. Failures surface to the caller as
/// [`crate::EmitError`] and end the turn.
pub trait DeviceControl: Send + Sync {
    /// Emit a protocol event with a JSON payload.
    fn send_event(&self, kind: EventKind, payload: serde_json::Value) -> Result<()>;

    /// Issue a playback command for a synthesized artifact.
    fn play_media(&self, command: &MediaCommand) -> Result<()>;
}

/// Type alias for shared device-control reference.
pub type DeviceControlRef = Arc<dyn DeviceControl>;

/// A captured outbound message, in emission order.
#[derive(Debug, Clone)]
pub enum DeviceMessage {
    Event {
        kind: EventKind,
        payload: serde_json::Value,
    },
    Media(MediaCommand),
}

/// In-memory device control for testing.
///
/// Captures all outbound traffic for later inspection.
#[derive(Default)]
pub struct InMemoryDeviceControl {
    log: Mutex<Vec<DeviceMessage>>,
}

impl InMemoryDeviceControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured messages in emission order.
    pub fn messages(&self) -> Vec<DeviceMessage> {
        self.log.lock().unwrap().clone()
    }

    /// Just the event kinds, in emission order.
    pub fn events(&self) -> Vec<EventKind> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                DeviceMessage::Event { kind, .. } => Some(*kind),
                DeviceMessage::Media(_) => None,
            })
            .collect()
    }

    /// Captured playback commands, in emission order.
    pub fn media_commands(&self) -> Vec<MediaCommand> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                DeviceMessage::Media(command) => Some(command.clone()),
                DeviceMessage::Event { .. } => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl DeviceControl for InMemoryDeviceControl {
    fn send_event(&self, kind: EventKind, payload: serde_json::Value) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(DeviceMessage::Event { kind, payload });
        Ok(())
    }

    fn play_media(&self, command: &MediaCommand) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(DeviceMessage::Media(command.clone()));
        Ok(())
    }
}
