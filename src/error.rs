//! Error types used by the worker state machine and routines.
//!
//! This module defines two error enums:
//!
//! - [`WorkerError`] — usage errors raised by the lifecycle API itself.
//! - [`RoutineError`] — errors raised by routine extension points.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/events. Cancellation is carried by [`RoutineError::Canceled`] but
//! is the designed termination signal for the run loop, not a failure; use
//! [`RoutineError::is_cancellation`] to distinguish it.

use thiserror::Error;

/// # Usage errors raised by the worker lifecycle API.
///
/// These are fatal to the call that raised them and leave the worker itself
/// untouched.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker has been shut down; it can never be started again.
    #[error("worker is disposed; start is permanently refused")]
    Disposed,

    /// A dependent was registered under an empty key.
    #[error("dependent key must not be empty")]
    EmptyKey,
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use workvisor::WorkerError;
    ///
    /// assert_eq!(WorkerError::Disposed.as_label(), "worker_disposed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Disposed => "worker_disposed",
            WorkerError::EmptyKey => "empty_key",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors produced by routine extension points.
///
/// Returned from `on_run_starting` and `cycle`. Any error ends the current
/// run: the loop exits and teardown brings the worker back to `Stopped`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RoutineError {
    /// The routine observed the cancellation signal and exited cooperatively.
    ///
    /// Not a failure: the run loop ends the run quietly without publishing
    /// a `CycleFailed` event.
    #[error("cancellation observed")]
    Canceled,

    /// The routine failed; the run ends and the worker settles to `Stopped`.
    #[error("routine failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl RoutineError {
    /// Convenience constructor for [`RoutineError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        RoutineError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use workvisor::RoutineError;
    ///
    /// let err = RoutineError::fail("boom");
    /// assert_eq!(err.as_label(), "routine_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RoutineError::Canceled => "routine_canceled",
            RoutineError::Fail { .. } => "routine_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RoutineError::Canceled => "cancellation observed".to_string(),
            RoutineError::Fail { error } => format!("error: {error}"),
        }
    }

    /// Indicates whether this is the designed cancellation signal rather
    /// than a genuine failure.
    ///
    /// # Example
    /// ```
    /// use workvisor::RoutineError;
    ///
    /// assert!(RoutineError::Canceled.is_cancellation());
    /// assert!(!RoutineError::fail("boom").is_cancellation());
    /// ```
    pub fn is_cancellation(&self) -> bool {
        matches!(self, RoutineError::Canceled)
    }
}
