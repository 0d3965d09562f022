//! Session control loop: one event stream, one decision point.
//!
//! All session input is funneled onto a single channel and handled in
//! arrival order, so frame classification, turn starts, and stops can
//! never interleave.

use palaver_audio::AudioFrame;
use palaver_events::EventKind;
use palaver_vad::FrameDecision;
use serde_json::json;
use tokio::sync::mpsc;

use crate::TurnSupervisor;

/// An input to the session control loop.
#[derive(Debug)]
pub enum ControlEvent {
    /// A captured audio frame arrived from the device.
    FrameReceived(AudioFrame),
    /// The device signalled the start of a listening run.
    TurnStartRequested,
    /// The device requested the current run be stopped.
    TurnStopRequested,
}

/// Serializes all session input through one handler.
pub struct ControlLoop {
    supervisor: TurnSupervisor,
}

impl ControlLoop {
    pub fn new(supervisor: TurnSupervisor) -> Self {
        Self { supervisor }
    }

    pub fn supervisor(&self) -> &TurnSupervisor {
        &self.supervisor
    }

    /// Drain the control channel until it closes, then cancel whatever
    /// turn is still live.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<ControlEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        tracing::debug!("control channel closed, session ending");
        self.supervisor.cancel_current();
    }

    fn handle(&self, event: ControlEvent) {
        match event {
            ControlEvent::TurnStartRequested => {
                tracing::info!("listening run started");
                self.emit(EventKind::RunStart);
                self.emit(EventKind::SttVadStart);
            }
            ControlEvent::FrameReceived(frame) => self.handle_frame(frame),
            ControlEvent::TurnStopRequested => {
                tracing::info!("run stop requested");
                // A cancelled turn announces its own end during
                // cleanup; only a stop with no live turn needs the
                // terminal event emitted here.
                if !self.supervisor.cancel_current() {
                    self.emit(EventKind::RunEnd);
                }
            }
        }
    }

    fn handle_frame(&self, frame: AudioFrame) {
        let decision = {
            let mut endpointer = self
                .supervisor
                .deps()
                .endpointer
                .lock()
                .expect("endpointer mutex poisoned");
            endpointer.classify(&frame)
        };

        // The endpoint only fires a turn when none is live; a running
        // turn keeps buffering the device's frames for its successor.
        let endpoint = decision == FrameDecision::EndpointReached && !self.supervisor.is_active();
        if endpoint {
            self.emit(EventKind::SttVadEnd);
        }

        // The triggering frame is enqueued too: it is part of the
        // utterance, ahead of the sentinel the turn task pushes.
        self.supervisor.deps().frames.push(frame);

        if endpoint {
            self.supervisor.start();
        }
    }

    fn emit(&self, kind: EventKind) {
        if let Err(err) = self.supervisor.deps().device.send_event(kind, json!({})) {
            tracing::warn!(event = kind.as_str(), error = %err, "event not delivered");
        }
    }
}
