//! Per-device WebSocket session.
//!
//! Each connected device gets its own frame queue, endpointer, and
//! supervisor; sessions share only the HTTP backends. Inbound traffic
//! is funneled onto the session's control channel, outbound events and
//! playback commands are serialized by a forwarder task.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures_util::{SinkExt, StreamExt};
use palaver_audio::{AudioFrame, FrameQueue};
use palaver_events::{DeviceControl, EmitError, EventKind, MediaCommand};
use palaver_turn::{
    ControlEvent, ControlLoop, ResponseWorkflow, Synthesizer, TurnDeps, TurnSupervisor,
};
use palaver_vad::{EnergyClassifier, Endpointer};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Backends shared by every device session.
pub struct SessionContext {
    pub workflow: Arc<dyn ResponseWorkflow>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub media_player_id: u32,
}

/// Inbound device traffic.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DeviceMessage {
    /// Start a listening run.
    RunStart,
    /// One captured frame of base64 PCM.
    Audio { pcm: String },
    /// Stop the current run.
    RunStop,
}

/// Outbound server traffic.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    Event {
        event: EventKind,
        payload: serde_json::Value,
    },
    PlayMedia { command: MediaCommand },
}

/// Fire-and-forget device control over the session's outbound channel.
struct WsDeviceControl {
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl DeviceControl for WsDeviceControl {
    fn send_event(
        &self,
        kind: EventKind,
        payload: serde_json::Value,
    ) -> palaver_events::Result<()> {
        self.tx
            .send(ServerMessage::Event {
                event: kind,
                payload,
            })
            .map_err(|_| EmitError::Closed)
    }

    fn play_media(&self, command: &MediaCommand) -> palaver_events::Result<()> {
        self.tx
            .send(ServerMessage::PlayMedia {
                command: command.clone(),
            })
            .map_err(|_| EmitError::Closed)
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(ctx): State<Arc<SessionContext>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, ctx))
}

async fn handle_socket(socket: WebSocket, ctx: Arc<SessionContext>) {
    tracing::info!("device connected");
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let forwarder = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(err) => {
                    tracing::warn!(error = %err, "outbound message not serializable");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut queue = FrameQueue::new();
    let receiver = queue
        .take_receiver()
        .expect("fresh queue always has its receiver");
    let deps = Arc::new(TurnDeps {
        frames: queue.sender(),
        receiver: tokio::sync::Mutex::new(receiver),
        device: Arc::new(WsDeviceControl { tx: out_tx }),
        workflow: ctx.workflow.clone(),
        synthesizer: ctx.synthesizer.clone(),
        endpointer: std::sync::Mutex::new(Endpointer::new(EnergyClassifier::new())),
        media_player_id: ctx.media_player_id,
    });

    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let control = ControlLoop::new(TurnSupervisor::new(deps));
    let control_task = tokio::spawn(control.run(control_rx));

    while let Some(Ok(message)) = ws_rx.next().await {
        let event = match message {
            Message::Text(text) => match serde_json::from_str::<DeviceMessage>(text.as_str()) {
                Ok(DeviceMessage::RunStart) => ControlEvent::TurnStartRequested,
                Ok(DeviceMessage::RunStop) => ControlEvent::TurnStopRequested,
                Ok(DeviceMessage::Audio { pcm }) => match BASE64.decode(pcm.as_bytes()) {
                    Ok(bytes) => ControlEvent::FrameReceived(AudioFrame::new(bytes)),
                    Err(err) => {
                        tracing::warn!(error = %err, "frame payload not base64, dropped");
                        continue;
                    }
                },
                Err(err) => {
                    tracing::warn!(error = %err, "unrecognized device message, dropped");
                    continue;
                }
            },
            // Raw binary frames skip the base64 detour.
            Message::Binary(bytes) => ControlEvent::FrameReceived(AudioFrame::new(bytes.to_vec())),
            Message::Close(_) => break,
            _ => continue,
        };
        if control_tx.send(event).is_err() {
            break;
        }
    }

    // Closing the control channel cancels whatever turn is live.
    drop(control_tx);
    let _ = control_task.await;
    forwarder.abort();
    tracing::info!("device disconnected");
}
