//! Single-turn supervision: at most one live turn task per device.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::task::TurnTask;
use crate::TurnDeps;

pub(crate) struct ActiveTurn {
    pub id: u64,
    pub cancel: CancellationToken,
    pub handle: JoinHandle<()>,
}

/// Shared slot holding the currently-running turn, if any. The task
/// clears its own entry during cleanup, guarded by the turn id so a
/// finished old task never clears a newer task's handle.
pub(crate) type ActiveSlot = Arc<Mutex<Option<ActiveTurn>>>;

/// Owns the single optional handle to the running turn task.
pub struct TurnSupervisor {
    deps: Arc<TurnDeps>,
    active: ActiveSlot,
    next_id: AtomicU64,
}

impl TurnSupervisor {
    pub fn new(deps: Arc<TurnDeps>) -> Self {
        Self {
            deps,
            active: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn deps(&self) -> &Arc<TurnDeps> {
        &self.deps
    }

    /// Spawn a turn task unless one is already live. Returns whether a
    /// new task was started; a no-op start is not an error.
    pub fn start(&self) -> bool {
        let mut active = self.active.lock().expect("active turn mutex poisoned");
        if let Some(turn) = active.as_ref() {
            if !turn.handle.is_finished() {
                tracing::debug!(turn = turn.id, "turn already active, start ignored");
                return false;
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let task = TurnTask::new(id, self.deps.clone(), cancel.clone(), self.active.clone());
        let handle = tokio::spawn(task.run());
        *active = Some(ActiveTurn { id, cancel, handle });
        tracing::info!(turn = id, "turn started");
        true
    }

    /// Request cooperative cancellation of the running turn, clearing
    /// the handle immediately without waiting for the task to wind
    /// down. Always resets the endpointer so the next utterance starts
    /// with a clean voice-activity model. Returns whether a live turn
    /// was actually cancelled.
    pub fn cancel_current(&self) -> bool {
        let cancelled = {
            let mut active = self.active.lock().expect("active turn mutex poisoned");
            match active.take() {
                Some(turn) if !turn.handle.is_finished() => {
                    turn.cancel.cancel();
                    tracing::info!(turn = turn.id, "turn cancellation requested");
                    true
                }
                _ => false,
            }
        };

        self.deps
            .endpointer
            .lock()
            .expect("endpointer mutex poisoned")
            .reset();

        cancelled
    }

    /// Whether a turn task is currently live.
    pub fn is_active(&self) -> bool {
        self.active
            .lock()
            .expect("active turn mutex poisoned")
            .as_ref()
            .map(|turn| !turn.handle.is_finished())
            .unwrap_or(false)
    }
}
