//! # Routine: the worker's extension points.
//!
//! This module defines the [`Routine`] trait — the three hooks a concrete
//! worker supplies — and a convenient function-backed implementation
//! [`RoutineFn`]. The common handle type is [`RoutineRef`], an
//! `Arc<dyn Routine>` suitable for sharing with the run loop.
//!
//! All three hooks are optional (default no-op). They are invoked on the
//! worker's own execution context and never concurrently with each other for
//! the same worker:
//!
//! ```text
//! start() ──► on_run_starting ──► [dependents started] ──► cycle, cycle, ... ──► [dependents stopped] ──► on_run_ending
//! ```
//!
//! A routine receives a [`CancellationToken`] and should check it regularly;
//! the state machine cannot un-block a cycle that ignores its cancellation
//! input.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::RoutineError;

/// Shared handle to a routine.
pub type RoutineRef = Arc<dyn Routine>;

/// # Extension points invoked by the worker state machine.
///
/// Every method has a default no-op body; implement only what you need.
/// Returning an error from `on_run_starting` or `cycle` ends the current run;
/// teardown (dependents stopped, [`on_run_ending`](Routine::on_run_ending),
/// state back to `Stopped`) always runs regardless.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use workvisor::{Routine, RoutineError};
///
/// struct Poller;
///
/// #[async_trait]
/// impl Routine for Poller {
///     async fn cycle(&self, ctx: CancellationToken) -> Result<(), RoutineError> {
///         if ctx.is_cancelled() {
///             return Err(RoutineError::Canceled);
///         }
///         // poll something...
///         tokio::time::sleep(std::time::Duration::from_millis(5)).await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Routine: Send + Sync + 'static {
    /// Called once per run, before any dependent is started and before the
    /// worker transitions to `Started`.
    ///
    /// An error skips the cycle loop; teardown still runs.
    async fn on_run_starting(&self, ctx: CancellationToken) -> Result<(), RoutineError> {
        let _ = ctx;
        Ok(())
    }

    /// Invoked repeatedly while the worker is `Started`.
    ///
    /// Each invocation is preceded by a cancellation check; a cycle that
    /// blocks should select on `ctx.cancelled()` so a forced stop can
    /// unblock it. Returning [`RoutineError::Canceled`] ends the run
    /// quietly; any other error ends it as a failure.
    async fn cycle(&self, ctx: CancellationToken) -> Result<(), RoutineError> {
        let _ = ctx;
        Ok(())
    }

    /// Called once per run during teardown, after every dependent has been
    /// stopped. The last hook to run before the worker settles to `Stopped`.
    async fn on_run_ending(&self) {}
}

/// Function-backed routine implementation.
///
/// Wraps a cycle closure that *creates* a new future per invocation, so no
/// shared mutable state is required. `on_run_starting` and `on_run_ending`
/// keep their default no-op bodies; implement [`Routine`] directly when you
/// need them.
///
/// ## Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use workvisor::{RoutineError, RoutineFn, RoutineRef};
///
/// let r: RoutineRef = RoutineFn::arc(|ctx: CancellationToken| async move {
///     if ctx.is_cancelled() {
///         return Err(RoutineError::Canceled);
///     }
///     // do one unit of work...
///     Ok(())
/// });
/// # let _ = r;
/// ```
pub struct RoutineFn<F> {
    f: F,
}

impl<F> RoutineFn<F> {
    /// Creates a new function-backed routine.
    ///
    /// Prefer [`RoutineFn::arc`] when you immediately need a [`RoutineRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the routine and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Routine for RoutineFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), RoutineError>> + Send + 'static,
{
    async fn cycle(&self, ctx: CancellationToken) -> Result<(), RoutineError> {
        (self.f)(ctx).await
    }
}

/// A routine with no behavior at all; useful for pure container workers that
/// exist only to cascade start/stop onto their dependents.
pub struct NoopRoutine;

#[async_trait]
impl Routine for NoopRoutine {
    async fn cycle(&self, ctx: CancellationToken) -> Result<(), RoutineError> {
        // Park until cancelled instead of busy-spinning the default no-op.
        ctx.cancelled().await;
        Err(RoutineError::Canceled)
    }
}
