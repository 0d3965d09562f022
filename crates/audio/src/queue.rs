//! Unbounded single-producer/single-consumer frame queue with an
//! end-of-utterance sentinel.
//!
//! The ingest path pushes without suspending; the active turn task is
//! the only consumer. The queue outlives individual turns: frames
//! arriving while a reply is being synthesized or played stay queued
//! and belong to the next utterance.

use tokio::sync::mpsc;

use crate::frame::{AudioFrame, Utterance};

/// Frame queue for one device session.
pub struct FrameQueue {
    sender: FrameSender,
    receiver: Option<FrameReceiver>,
}

impl FrameQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sender: FrameSender { tx },
            receiver: Some(FrameReceiver { rx }),
        }
    }

    /// Get a clone of the sender.
    pub fn sender(&self) -> FrameSender {
        self.sender.clone()
    }

    /// Take the receiver (can only be called once).
    pub fn take_receiver(&mut self) -> Option<FrameReceiver> {
        self.receiver.take()
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half: never suspends, never fails while the queue is open.
#[derive(Clone)]
pub struct FrameSender {
    tx: mpsc::UnboundedSender<AudioFrame>,
}

impl FrameSender {
    /// Push a frame. Buffers indefinitely; a closed queue only happens
    /// when the session is torn down, so the frame is silently dropped.
    pub fn push(&self, frame: AudioFrame) {
        if self.tx.send(frame).is_err() {
            tracing::debug!("frame queue closed, dropping frame");
        }
    }

    /// Push the end-of-utterance sentinel, closing out everything
    /// queued so far as one utterance.
    pub fn end_utterance(&self) {
        self.push(AudioFrame::sentinel());
    }
}

/// Consumer half, owned by the supervisor and lent to the active turn.
pub struct FrameReceiver {
    rx: mpsc::UnboundedReceiver<AudioFrame>,
}

impl FrameReceiver {
    /// Receive the next frame, suspending until one is available.
    /// Returns `None` once all senders are dropped.
    pub async fn pop(&mut self) -> Option<AudioFrame> {
        self.rx.recv().await
    }

    /// Drain frames in arrival order until the sentinel, returning the
    /// accumulated utterance. Frames pushed after the sentinel remain
    /// queued for the next turn. Returns `None` if the queue closes
    /// before a sentinel arrives.
    pub async fn drain_utterance(&mut self) -> Option<Utterance> {
        let mut utterance = Utterance::new();
        loop {
            let frame = self.pop().await?;
            if frame.is_sentinel() {
                tracing::debug!(
                    frames = utterance.frame_count(),
                    duration_ms = utterance.duration_ms(),
                    "utterance drained"
                );
                return Some(utterance);
            }
            utterance.push_frame(&frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FRAME_BYTES;

    fn frame(fill: u8) -> AudioFrame {
        AudioFrame::new(vec![fill; FRAME_BYTES])
    }

    #[tokio::test]
    async fn test_push_pop_order() {
        let mut queue = FrameQueue::new();
        let sender = queue.sender();
        let mut receiver = queue.take_receiver().unwrap();

        for i in 0..5u8 {
            sender.push(frame(i));
        }

        for i in 0..5u8 {
            let got = receiver.pop().await.unwrap();
            assert_eq!(got.bytes()[0], i);
        }
    }

    #[tokio::test]
    async fn test_drain_stops_at_sentinel() {
        let mut queue = FrameQueue::new();
        let sender = queue.sender();
        let mut receiver = queue.take_receiver().unwrap();

        sender.push(frame(1));
        sender.push(frame(2));
        sender.end_utterance();
        // Belongs to the next utterance.
        sender.push(frame(3));

        let utterance = receiver.drain_utterance().await.unwrap();
        assert_eq!(utterance.frame_count(), 2);
        assert_eq!(utterance.pcm().len(), 2 * FRAME_BYTES);

        let leftover = receiver.pop().await.unwrap();
        assert_eq!(leftover.bytes()[0], 3);
    }

    #[tokio::test]
    async fn test_queue_reusable_across_turns() {
        let mut queue = FrameQueue::new();
        let sender = queue.sender();
        let mut receiver = queue.take_receiver().unwrap();

        sender.push(frame(1));
        sender.end_utterance();
        sender.push(frame(2));
        sender.end_utterance();

        let first = receiver.drain_utterance().await.unwrap();
        let second = receiver.drain_utterance().await.unwrap();
        assert_eq!(first.pcm()[0], 1);
        assert_eq!(second.pcm()[0], 2);
    }

    #[tokio::test]
    async fn test_drain_none_when_closed_without_sentinel() {
        let mut queue = FrameQueue::new();
        let sender = queue.sender();
        let mut receiver = queue.take_receiver().unwrap();

        sender.push(frame(1));
        drop(sender);
        drop(queue);

        assert!(receiver.drain_utterance().await.is_none());
    }
}
