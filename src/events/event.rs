//! # Lifecycle events emitted by workers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: the state-machine flow (starting, started,
//!   stopping, stopped).
//! - **Failure events**: routine extension points that raised an error and
//!   stop escalations past the grace period.
//! - **Registry events**: dependents added to / removed from a worker.
//!
//! The [`Event`] struct carries metadata such as timestamps, the worker name,
//! the dependent key, and error messages.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events from
//! several workers interleave on a shared bus.
//!
//! ## Example
//! ```rust
//! use workvisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::CycleFailed)
//!     .with_worker("feed")
//!     .with_error("connection reset");
//!
//! assert_eq!(ev.kind, EventKind::CycleFailed);
//! assert_eq!(ev.worker.as_deref(), Some("feed"));
//! assert_eq!(ev.error.as_deref(), Some("connection reset"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of worker lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Lifecycle events ===
    /// The execution context is up and the pre-start hook is about to run.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerStarting,

    /// The pre-start hook finished, all dependents were started, and the
    /// cycle loop is entered.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerStarted,

    /// Teardown began: dependents are about to be stopped.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerStopping,

    /// Teardown finished; the worker is back at `Stopped`.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerStopped,

    // === Failure events ===
    /// The `cycle` extension point returned a non-cancellation error; the
    /// run ends and teardown follows.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `error`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CycleFailed,

    /// A hook (`on_run_starting`) returned a non-cancellation error; the
    /// cycle loop is skipped and teardown follows.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `error`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    HookFailed,

    /// `stop()` exhausted the cooperative grace period and force-raised the
    /// cancellation signal.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ForceCanceled,

    /// The worker was disposed; its run handle and cancellation signal were
    /// released and `start` is permanently refused.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Disposed,

    // === Registry events ===
    /// A dependent was registered on this worker.
    ///
    /// Sets:
    /// - `worker`: parent worker name
    /// - `key`: registry key of the dependent
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DependentAdded,

    /// A dependent was removed from this worker's registry.
    ///
    /// Sets:
    /// - `worker`: parent worker name
    /// - `key`: registry key of the dependent
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DependentRemoved,

    /// A dependent could not be started during the cascade (it was disposed).
    ///
    /// Sets:
    /// - `worker`: parent worker name
    /// - `key`: registry key of the dependent
    /// - `error`: failure label
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DependentStartFailed,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the worker, if applicable.
    pub worker: Option<Arc<str>>,
    /// Registry key of a dependent, if applicable.
    pub key: Option<Arc<str>>,
    /// Human-readable error message, if applicable.
    pub error: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next global sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            key: None,
            error: None,
        }
    }

    /// Attaches a worker name.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches a dependent registry key.
    #[inline]
    pub fn with_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches a human-readable error message.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// True for events that report a failure rather than normal flow.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            EventKind::CycleFailed | EventKind::HookFailed | EventKind::DependentStartFailed
        )
    }
}
