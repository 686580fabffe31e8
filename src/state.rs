//! # Worker lifecycle states.
//!
//! [`WorkerState`] is the four-value status a [`Worker`](crate::Worker) moves
//! through, and [`StateCell`] is its atomic storage.
//!
//! ## Transitions
//! ```text
//!            start()                 run loop
//! Stopped ──────────► Starting ──────────────► Started
//!    ▲                                            │
//!    │            run loop teardown               │ stop() / cancellation /
//!    └──────────────── Stopping ◄─────────────────┘ cycle failure
//! ```
//!
//! ## Rules
//! - `Stopped` is the initial state and is re-enterable: a full stop returns
//!   the worker to `Stopped`, from where a fresh `start()` is valid.
//! - The state is the one field read across threads without a lock (the
//!   unlocked fast path in `start`/`stop`), so all access goes through
//!   [`StateCell`] with Acquire/Release ordering.
//! - Writers: the `start()` caller stores `Starting`; every other transition
//!   is stored from the worker's own execution context (or from `stop()`,
//!   holding the transition lock).

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// No execution context is active. Initial state; re-entered after a full stop.
    Stopped = 0,
    /// `start()` accepted the transition; the execution context is being spawned
    /// and is running the pre-start hook and the dependent cascade.
    Starting = 1,
    /// The run loop is invoking `cycle` until told to stop.
    Started = 2,
    /// Teardown in progress: dependents are being stopped and the post-stop
    /// hook is running.
    Stopping = 3,
}

impl WorkerState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => WorkerState::Starting,
            2 => WorkerState::Started,
            3 => WorkerState::Stopping,
            _ => WorkerState::Stopped,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/events.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerState::Stopped => "stopped",
            WorkerState::Starting => "starting",
            WorkerState::Started => "started",
            WorkerState::Stopping => "stopping",
        }
    }
}

/// Atomic storage for a [`WorkerState`].
///
/// Cross-thread reads of the state are deliberate (the fast path of
/// `start`/`stop` reads it outside the transition lock), so visibility is
/// guaranteed here explicitly: stores are Release, loads are Acquire.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new(state: WorkerState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn load(&self) -> WorkerState {
        WorkerState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: WorkerState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_preserved() {
        let cell = StateCell::new(WorkerState::Stopped);
        assert_eq!(cell.load(), WorkerState::Stopped);
    }

    #[test]
    fn test_store_then_load_round_trips_all_states() {
        let cell = StateCell::new(WorkerState::Stopped);
        for state in [
            WorkerState::Starting,
            WorkerState::Started,
            WorkerState::Stopping,
            WorkerState::Stopped,
        ] {
            cell.store(state);
            assert_eq!(cell.load(), state);
        }
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(WorkerState::Stopped.as_label(), "stopped");
        assert_eq!(WorkerState::Starting.as_label(), "starting");
        assert_eq!(WorkerState::Started.as_label(), "started");
        assert_eq!(WorkerState::Stopping.as_label(), "stopping");
    }
}
