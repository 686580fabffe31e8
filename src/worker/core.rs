//! # Worker: the lifecycle state machine.
//!
//! A [`Worker`] owns one execution context (a long-running spawned task), one
//! cancellation token per run, and a [`DependentRegistry`]. It exposes
//! `start`/`stop`/`shutdown` and drives the routine's extension points:
//!
//! ## Run flow
//! ```text
//! start()                      spawned execution context
//!   ├─► guard: Stopped?          ├─► publish(WorkerStarting)
//!   ├─► state = Starting         ├─► routine.on_run_starting()
//!   ├─► arm fresh token          ├─► dependents.start_all()
//!   └─► spawn run loop           ├─► state = Started, publish(WorkerStarted)
//!                                ├─► loop: cancellation check → routine.cycle()
//! stop()                         │
//!   ├─► guard: Started?          │   teardown (always runs):
//!   ├─► state = Stopping ────────┤     ├─► state = Stopping, publish(WorkerStopping)
//!   ├─► wait grace for the run   │     ├─► dependents.stop_all()
//!   ├─► else force-cancel token ─┘     ├─► routine.on_run_ending()
//!   └─► wait for the run to exit       └─► state = Stopped, publish(WorkerStopped)
//! ```
//!
//! ## Rules
//! - `start` and `stop` are idempotent: they act only when the precondition
//!   state holds (`Stopped` and `Started` respectively) and no-op otherwise.
//! - Both use a double-checked guard: an unlocked atomic read as the fast
//!   path, re-checked under the transition lock before acting. The lock is
//!   the sole correctness mechanism; the unlocked read only avoids
//!   contention on the common "already there" case.
//! - Exactly one execution context is ever spawned per run, and exactly one
//!   caller runs the grace-then-force stop sequence.
//! - Every run arms a fresh cancellation token; a fired token is never
//!   reused across runs.
//! - Teardown runs on the execution context even when a hook or cycle
//!   fails, so the worker always settles back to `Stopped`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::events::{Bus, Event, EventKind};
use crate::state::{StateCell, WorkerState};
use crate::worker::registry::DependentRegistry;
use crate::worker::routine::{Routine, RoutineRef};

/// Handle to one run of the worker: the spawned execution context and the
/// cancellation token armed for it.
struct RunHandle {
    join: JoinHandle<()>,
    cancel: CancellationToken,
}

/// A long-running background unit of work with a controlled lifecycle.
///
/// Construct via [`Worker::builder`]; the builder returns an `Arc<Worker>`
/// so the same handle can be started, registered as a dependent, and shared
/// with subscribers.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use workvisor::{RoutineError, RoutineFn, Worker, WorkerState};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), workvisor::WorkerError> {
///     let ticker = Worker::builder(
///         "ticker",
///         RoutineFn::new(|ctx: CancellationToken| async move {
///             if ctx.is_cancelled() {
///                 return Err(RoutineError::Canceled);
///             }
///             tokio::time::sleep(Duration::from_millis(1)).await;
///             Ok(())
///         }),
///     )
///     .build();
///
///     ticker.start().await?;
///     tokio::time::sleep(Duration::from_millis(10)).await;
///     ticker.stop().await;
///     assert_eq!(ticker.state(), WorkerState::Stopped);
///
///     ticker.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct Worker {
    name: Arc<str>,
    cfg: WorkerConfig,
    routine: RoutineRef,
    state: StateCell,
    /// Execution-context slot; its mutex doubles as the start/stop
    /// transition lock.
    run: Mutex<Option<RunHandle>>,
    dependents: DependentRegistry,
    bus: Bus,
    disposed: AtomicBool,
}

impl Worker {
    /// Starts building a worker around the given routine.
    pub fn builder(name: impl Into<Arc<str>>, routine: impl Routine) -> WorkerBuilder {
        WorkerBuilder::new(name.into(), Arc::new(routine))
    }

    /// Like [`Worker::builder`] for a routine that is already shared.
    pub fn builder_shared(name: impl Into<Arc<str>>, routine: RoutineRef) -> WorkerBuilder {
        WorkerBuilder::new(name.into(), routine)
    }

    /// Requests the `Stopped → Starting` transition and spawns the execution
    /// context. Returns once the transition is requested; it does not wait
    /// for `Started`.
    ///
    /// Idempotent: calling it while `Starting`, `Started`, or `Stopping` is a
    /// no-op. Under concurrent callers exactly one execution context is
    /// spawned.
    ///
    /// # Errors
    /// [`WorkerError::Disposed`] after [`Worker::shutdown`]; a disposed
    /// worker is permanently unusable.
    pub async fn start(self: &Arc<Self>) -> Result<(), WorkerError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(WorkerError::Disposed);
        }
        // unlocked fast path; the locked re-check below decides
        if self.state.load() != WorkerState::Stopped {
            return Ok(());
        }

        let mut slot = self.run.lock().await;
        if self.disposed.load(Ordering::Acquire) {
            return Err(WorkerError::Disposed);
        }
        if self.state.load() != WorkerState::Stopped {
            return Ok(());
        }

        self.state.store(WorkerState::Starting);
        // every run gets a fresh single-shot token
        let cancel = CancellationToken::new();
        let ctx = cancel.clone();
        let me = Arc::clone(self);
        let join = tokio::spawn(me.run_loop(ctx));
        *slot = Some(RunHandle { join, cancel });
        Ok(())
    }

    /// Requests the `Started → Stopping` transition and waits for the run to
    /// wind down: first a cooperative grace period
    /// ([`WorkerConfig::grace`]), then a force-raised cancellation signal.
    ///
    /// Returns once the execution context has exited. A cycle that ignores
    /// its cancellation token cannot be unblocked from here; stop returns as
    /// soon as the cycle observes the signal.
    ///
    /// Always settles the worker back to `Stopped`, a run that died without
    /// running its own teardown (a panicking routine) included: in that case
    /// stop performs the teardown itself, stopping the dependents before it
    /// returns.
    ///
    /// Idempotent: a no-op while `Stopped`, `Starting`, or `Stopping`
    /// (a never-started worker included). Under concurrent callers exactly
    /// one runs the grace-then-force sequence.
    pub async fn stop(&self) {
        if self.state.load() != WorkerState::Started {
            return;
        }
        let mut slot = self.run.lock().await;
        if self.state.load() != WorkerState::Started {
            return;
        }

        self.state.store(WorkerState::Stopping);
        let mut crashed = false;
        if let Some(mut handle) = slot.take() {
            let joined = match time::timeout(self.cfg.grace, &mut handle.join).await {
                Ok(joined) => joined,
                Err(_elapsed) => {
                    handle.cancel.cancel();
                    self.bus.publish(
                        Event::now(EventKind::ForceCanceled).with_worker(self.name.clone()),
                    );
                    (&mut handle.join).await
                }
            };
            crashed = joined.is_err();
        }
        if crashed {
            // the run died mid-flight; its teardown never ran
            self.bus.publish(
                Event::now(EventKind::CycleFailed)
                    .with_worker(self.name.clone())
                    .with_error("routine panicked"),
            );
            self.dependents.stop_all().await;
        }
        // settle regardless of how the run ended; also closes the window
        // where the Stopping store above landed after the run's own
        // Stopped store
        self.state.store(WorkerState::Stopped);
        if crashed {
            self.bus
                .publish(Event::now(EventKind::WorkerStopped).with_worker(self.name.clone()));
        }
    }

    /// Releases the execution-context handle and the cancellation signal.
    ///
    /// One-shot: the first caller stops the worker and releases its
    /// resources; every later call (and the automatic cleanup on drop) is a
    /// no-op. A run still live after the grace period is aborted rather
    /// than leaked, so a live handle is never released.
    ///
    /// After `shutdown`, [`Worker::start`] returns
    /// [`WorkerError::Disposed`] forever; the instance does not re-arm.
    pub async fn shutdown(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.stop().await;

        let mut slot = self.run.lock().await;
        if let Some(mut handle) = slot.take() {
            // covers a worker stuck in Starting, which stop() does not touch
            handle.cancel.cancel();
            if time::timeout(self.cfg.grace, &mut handle.join).await.is_err() {
                handle.join.abort();
            }
        }
        drop(slot);
        if self.state.load() != WorkerState::Stopped {
            // the run never reached its own teardown (a hook that panicked,
            // or an aborted cycle); stop the dependents and settle here
            self.dependents.stop_all().await;
            self.state.store(WorkerState::Stopped);
        }
        self.bus
            .publish(Event::now(EventKind::Disposed).with_worker(self.name.clone()));
    }

    /// The execution context: hooks, dependent cascade, cycle loop, teardown.
    ///
    /// Boxed: the start cascade recurses through each dependent's `start`,
    /// which contains this future again.
    fn run_loop(
        self: Arc<Self>,
        ctx: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(self.run(ctx))
    }

    async fn run(self: Arc<Self>, ctx: CancellationToken) {
        self.bus
            .publish(Event::now(EventKind::WorkerStarting).with_worker(self.name.clone()));

        let mut entered = false;
        match self.routine.on_run_starting(ctx.clone()).await {
            Ok(()) => {
                for (key, err) in self.dependents.start_all().await {
                    self.bus.publish(
                        Event::now(EventKind::DependentStartFailed)
                            .with_worker(self.name.clone())
                            .with_key(key)
                            .with_error(err.as_label()),
                    );
                }
                self.state.store(WorkerState::Started);
                self.bus
                    .publish(Event::now(EventKind::WorkerStarted).with_worker(self.name.clone()));
                entered = true;
            }
            Err(err) if err.is_cancellation() => {}
            Err(err) => {
                self.bus.publish(
                    Event::now(EventKind::HookFailed)
                        .with_worker(self.name.clone())
                        .with_error(err.as_message()),
                );
            }
        }

        if entered {
            loop {
                // every iteration is a cancellation point
                if ctx.is_cancelled() || self.state.load() != WorkerState::Started {
                    break;
                }
                match self.routine.cycle(ctx.clone()).await {
                    Ok(()) => {}
                    Err(err) if err.is_cancellation() => break,
                    Err(err) => {
                        self.bus.publish(
                            Event::now(EventKind::CycleFailed)
                                .with_worker(self.name.clone())
                                .with_error(err.as_message()),
                        );
                        break;
                    }
                }
                // a cycle that never awaits must still yield to the runtime
                tokio::task::yield_now().await;
            }
        }

        // teardown always runs, hook and cycle failures included
        self.state.store(WorkerState::Stopping);
        self.bus
            .publish(Event::now(EventKind::WorkerStopping).with_worker(self.name.clone()));
        self.dependents.stop_all().await;
        self.routine.on_run_ending().await;
        self.state.store(WorkerState::Stopped);
        self.bus
            .publish(Event::now(EventKind::WorkerStopped).with_worker(self.name.clone()));
    }

    /// Registers a dependent worker; it will be started and stopped as part
    /// of this worker's own cascade.
    ///
    /// Returns whether the dependent was newly added (`false` on a
    /// case-insensitive duplicate key). Registration does not start the
    /// dependent.
    ///
    /// # Errors
    /// [`WorkerError::EmptyKey`] for an empty key.
    pub async fn add_dependent(
        &self,
        key: &str,
        worker: Arc<Worker>,
    ) -> Result<bool, WorkerError> {
        let added = self.dependents.add(key, worker).await?;
        if added {
            self.bus.publish(
                Event::now(EventKind::DependentAdded)
                    .with_worker(self.name.clone())
                    .with_key(key),
            );
        }
        Ok(added)
    }

    /// Removes a dependent by key; the dependent itself is left running or
    /// stopped as it was.
    pub async fn remove_dependent(&self, key: &str) -> Option<Arc<Worker>> {
        let removed = self.dependents.remove(key).await;
        if removed.is_some() {
            self.bus.publish(
                Event::now(EventKind::DependentRemoved)
                    .with_worker(self.name.clone())
                    .with_key(key),
            );
        }
        removed
    }

    /// The dependent registry, for lookups and bulk operations.
    pub fn dependents(&self) -> &DependentRegistry {
        &self.dependents
    }

    /// Current lifecycle state (relaxed snapshot; may change immediately).
    pub fn state(&self) -> WorkerState {
        self.state.load()
    }

    /// Worker name as given to the builder.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once [`Worker::shutdown`] has run (or the worker was dropped).
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Creates a receiver for this worker's lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// The event bus; share it with child workers via
    /// [`WorkerBuilder::with_bus`] to observe a whole tree on one receiver.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}

impl Drop for Worker {
    /// Automatic cleanup path; suppressed after an explicit
    /// [`Worker::shutdown`] by the same one-shot guard.
    fn drop(&mut self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        // the run loop holds its own Arc, so a live run keeps the worker
        // alive; anything still parked here is finished or never ran
        if let Ok(mut slot) = self.run.try_lock() {
            if let Some(handle) = slot.take() {
                handle.cancel.cancel();
                handle.join.abort();
            }
        }
    }
}

/// Builder for [`Worker`].
///
/// ```
/// use std::time::Duration;
/// use workvisor::{NoopRoutine, Worker};
///
/// let worker = Worker::builder("parent", NoopRoutine)
///     .with_grace(Duration::from_millis(50))
///     .build();
/// assert_eq!(worker.name(), "parent");
/// ```
pub struct WorkerBuilder {
    name: Arc<str>,
    routine: RoutineRef,
    cfg: WorkerConfig,
    bus: Option<Bus>,
}

impl WorkerBuilder {
    fn new(name: Arc<str>, routine: RoutineRef) -> Self {
        Self {
            name,
            routine,
            cfg: WorkerConfig::default(),
            bus: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, cfg: WorkerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the cooperative grace period used by `stop`.
    pub fn with_grace(mut self, grace: std::time::Duration) -> Self {
        self.cfg.grace = grace;
        self
    }

    /// Publishes this worker's events on an existing bus instead of a fresh
    /// one. Useful to observe a parent and its dependents together.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the worker. State starts at `Stopped`.
    pub fn build(self) -> Arc<Worker> {
        let bus = self
            .bus
            .unwrap_or_else(|| Bus::new(self.cfg.bus_capacity_clamped()));
        Arc::new(Worker {
            name: self.name,
            cfg: self.cfg,
            routine: self.routine,
            state: StateCell::new(WorkerState::Stopped),
            run: Mutex::new(None),
            dependents: DependentRegistry::new(),
            bus,
            disposed: AtomicBool::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RoutineError;
    use crate::worker::routine::NoopRoutine;

    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;

    /// Routine that counts hook invocations and can misbehave on demand.
    #[derive(Default)]
    struct Probe {
        starts: AtomicUsize,
        cycles: AtomicUsize,
        endings: AtomicUsize,
        fail_hook: bool,
        fail_cycle: bool,
        panic_hook: bool,
        panic_cycle: bool,
        /// Cycle blocks until cancelled, ignoring the grace period.
        block: bool,
    }

    #[async_trait]
    impl Routine for Probe {
        async fn on_run_starting(&self, _ctx: CancellationToken) -> Result<(), RoutineError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if self.panic_hook {
                panic!("hook panic");
            }
            if self.fail_hook {
                return Err(RoutineError::fail("hook boom"));
            }
            Ok(())
        }

        async fn cycle(&self, ctx: CancellationToken) -> Result<(), RoutineError> {
            self.cycles.fetch_add(1, Ordering::SeqCst);
            if self.panic_cycle {
                panic!("cycle panic");
            }
            if self.fail_cycle {
                return Err(RoutineError::fail("cycle boom"));
            }
            if self.block {
                ctx.cancelled().await;
                return Err(RoutineError::Canceled);
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok(())
        }

        async fn on_run_ending(&self) {
            self.endings.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn probe_worker(probe: &Arc<Probe>) -> Arc<Worker> {
        Worker::builder_shared("probe", probe.clone()).build()
    }

    async fn wait_for_state(worker: &Worker, state: WorkerState) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while worker.state() != state {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "worker never reached {:?} (still {:?})",
                state,
                worker.state()
            )
        });
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    #[tokio::test]
    async fn test_state_is_stopped_after_construction() {
        let worker = Worker::builder("fresh", NoopRoutine).build();
        assert_eq!(worker.state(), WorkerState::Stopped);
        assert!(!worker.is_disposed());
    }

    #[tokio::test]
    async fn test_start_reaches_started_and_stop_returns_to_stopped() {
        let probe = Arc::new(Probe::default());
        let worker = probe_worker(&probe);

        worker.start().await.unwrap();
        wait_for_state(&worker, WorkerState::Started).await;

        worker.stop().await;
        assert_eq!(worker.state(), WorkerState::Stopped);
        assert_eq!(probe.starts.load(Ordering::SeqCst), 1);
        assert_eq!(probe.endings.load(Ordering::SeqCst), 1);
        assert!(probe.cycles.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_start_on_running_worker_is_noop() {
        let probe = Arc::new(Probe::default());
        let worker = probe_worker(&probe);

        worker.start().await.unwrap();
        wait_for_state(&worker, WorkerState::Started).await;
        worker.start().await.unwrap();
        worker.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(probe.starts.load(Ordering::SeqCst), 1, "no second spawn");
        worker.stop().await;
    }

    #[tokio::test]
    async fn test_stop_on_never_started_worker_is_noop() {
        let probe = Arc::new(Probe::default());
        let worker = probe_worker(&probe);

        worker.stop().await;
        assert_eq!(worker.state(), WorkerState::Stopped);
        assert_eq!(probe.endings.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_starts_spawn_one_context() {
        let probe = Arc::new(Probe::default());
        let worker = probe_worker(&probe);

        let mut joins = Vec::new();
        for _ in 0..16 {
            let w = worker.clone();
            joins.push(tokio::spawn(async move { w.start().await }));
        }
        for j in joins {
            j.await.unwrap().unwrap();
        }

        wait_for_state(&worker, WorkerState::Started).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(probe.starts.load(Ordering::SeqCst), 1);
        worker.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stops_run_one_teardown() {
        let probe = Arc::new(Probe::default());
        let worker = probe_worker(&probe);

        worker.start().await.unwrap();
        wait_for_state(&worker, WorkerState::Started).await;

        let mut joins = Vec::new();
        for _ in 0..16 {
            let w = worker.clone();
            joins.push(tokio::spawn(async move { w.stop().await }));
        }
        for j in joins {
            j.await.unwrap();
        }

        assert_eq!(worker.state(), WorkerState::Stopped);
        assert_eq!(probe.endings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dependents_cascade_start_and_stop() {
        let parent = Worker::builder("parent", NoopRoutine).build();
        let mut children = Vec::new();
        for key in ["a", "b", "c"] {
            let probe = Arc::new(Probe::default());
            let child = probe_worker(&probe);
            assert!(parent.add_dependent(key, child.clone()).await.unwrap());
            children.push(child);
        }

        parent.start().await.unwrap();
        wait_for_state(&parent, WorkerState::Started).await;
        for child in &children {
            wait_for_state(child, WorkerState::Started).await;
        }

        parent.stop().await;
        assert_eq!(parent.state(), WorkerState::Stopped);
        for child in &children {
            assert_eq!(child.state(), WorkerState::Stopped);
        }
    }

    #[tokio::test]
    async fn test_nested_cascade_starts_and_stops() {
        let grandchild = Worker::builder("grandchild", NoopRoutine).build();
        let child = Worker::builder("child", NoopRoutine).build();
        let root = Worker::builder("root", NoopRoutine).build();
        child
            .add_dependent("grandchild", grandchild.clone())
            .await
            .unwrap();
        root.add_dependent("child", child.clone()).await.unwrap();

        root.start().await.unwrap();
        wait_for_state(&root, WorkerState::Started).await;
        wait_for_state(&child, WorkerState::Started).await;
        wait_for_state(&grandchild, WorkerState::Started).await;

        root.stop().await;
        assert_eq!(root.state(), WorkerState::Stopped);
        assert_eq!(child.state(), WorkerState::Stopped);
        assert_eq!(grandchild.state(), WorkerState::Stopped);
    }

    /// Routine whose `on_run_ending` records whether its dependent had
    /// already settled to `Stopped`.
    struct OrderingProbe {
        dependent: Arc<Worker>,
        dependent_was_stopped: AtomicBool,
    }

    #[async_trait]
    impl Routine for OrderingProbe {
        async fn cycle(&self, ctx: CancellationToken) -> Result<(), RoutineError> {
            ctx.cancelled().await;
            Err(RoutineError::Canceled)
        }

        async fn on_run_ending(&self) {
            self.dependent_was_stopped.store(
                self.dependent.state() == WorkerState::Stopped,
                Ordering::SeqCst,
            );
        }
    }

    #[tokio::test]
    async fn test_on_run_ending_runs_after_dependents_stopped() {
        let child = Worker::builder("child", NoopRoutine).build();
        let routine = Arc::new(OrderingProbe {
            dependent: child.clone(),
            dependent_was_stopped: AtomicBool::new(false),
        });
        let parent = Worker::builder_shared("parent", routine.clone()).build();
        parent.add_dependent("child", child.clone()).await.unwrap();

        parent.start().await.unwrap();
        wait_for_state(&parent, WorkerState::Started).await;
        wait_for_state(&child, WorkerState::Started).await;

        parent.stop().await;
        assert!(routine.dependent_was_stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_duplicate_dependent_key_is_rejected() {
        let parent = Worker::builder("parent", NoopRoutine).build();
        let first = Worker::builder("first", NoopRoutine).build();
        let second = Worker::builder("second", NoopRoutine).build();

        assert!(parent.add_dependent("Worker", first.clone()).await.unwrap());
        assert!(!parent.add_dependent("WORKER", second).await.unwrap());

        let kept = parent.dependents().get("worker").await.unwrap();
        assert!(Arc::ptr_eq(&kept, &first));
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let probe = Arc::new(Probe::default());
        let worker = probe_worker(&probe);

        worker.start().await.unwrap();
        wait_for_state(&worker, WorkerState::Started).await;

        worker.shutdown().await;
        assert_eq!(worker.state(), WorkerState::Stopped);
        assert!(worker.is_disposed());
        assert_eq!(probe.endings.load(Ordering::SeqCst), 1);

        // second call observes the guard and touches nothing
        worker.shutdown().await;
        assert_eq!(probe.endings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_start_after_shutdown_is_refused() {
        let worker = Worker::builder("w", NoopRoutine).build();
        worker.shutdown().await;

        let err = worker.start().await.unwrap_err();
        assert!(matches!(err, WorkerError::Disposed));
        assert_eq!(worker.state(), WorkerState::Stopped);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocked_cycle_is_force_canceled_exactly_once() {
        let probe = Arc::new(Probe {
            block: true,
            ..Probe::default()
        });
        let worker = probe_worker(&probe);
        let mut rx = worker.subscribe();

        worker.start().await.unwrap();
        wait_for_state(&worker, WorkerState::Started).await;

        // stop must escalate past the grace period and still return
        tokio::time::timeout(Duration::from_secs(2), worker.stop())
            .await
            .expect("stop hung on a blocked cycle");
        assert_eq!(worker.state(), WorkerState::Stopped);

        let forced = drain(&mut rx)
            .iter()
            .filter(|e| e.kind == EventKind::ForceCanceled)
            .count();
        assert_eq!(forced, 1);
    }

    #[tokio::test]
    async fn test_prompt_cycle_stops_without_forced_cancellation() {
        let probe = Arc::new(Probe::default());
        let worker = probe_worker(&probe);
        let mut rx = worker.subscribe();

        worker.start().await.unwrap();
        wait_for_state(&worker, WorkerState::Started).await;
        worker.stop().await;

        assert!(
            drain(&mut rx)
                .iter()
                .all(|e| e.kind != EventKind::ForceCanceled)
        );
    }

    #[tokio::test]
    async fn test_round_trip_restart() {
        let probe = Arc::new(Probe::default());
        let worker = probe_worker(&probe);

        for round in 1..=2 {
            worker.start().await.unwrap();
            wait_for_state(&worker, WorkerState::Started).await;
            worker.stop().await;
            assert_eq!(worker.state(), WorkerState::Stopped);
            assert_eq!(probe.starts.load(Ordering::SeqCst), round);
            assert_eq!(probe.endings.load(Ordering::SeqCst), round);
        }
    }

    #[tokio::test]
    async fn test_cycle_failure_still_tears_down() {
        let probe = Arc::new(Probe {
            fail_cycle: true,
            ..Probe::default()
        });
        let worker = probe_worker(&probe);
        let mut rx = worker.subscribe();

        worker.start().await.unwrap();
        wait_for_state(&worker, WorkerState::Stopped).await;

        assert_eq!(probe.endings.load(Ordering::SeqCst), 1);
        assert!(
            drain(&mut rx)
                .iter()
                .any(|e| e.kind == EventKind::CycleFailed)
        );
    }

    #[tokio::test]
    async fn test_hook_failure_still_tears_down() {
        let probe = Arc::new(Probe {
            fail_hook: true,
            ..Probe::default()
        });
        let worker = probe_worker(&probe);
        let mut rx = worker.subscribe();

        worker.start().await.unwrap();
        wait_for_state(&worker, WorkerState::Stopped).await;

        assert_eq!(probe.cycles.load(Ordering::SeqCst), 0);
        assert_eq!(probe.endings.load(Ordering::SeqCst), 1);
        assert!(drain(&mut rx).iter().any(|e| e.kind == EventKind::HookFailed));
    }

    #[tokio::test]
    async fn test_panicking_cycle_is_settled_by_stop() {
        let probe = Arc::new(Probe {
            panic_cycle: true,
            ..Probe::default()
        });
        let worker = probe_worker(&probe);
        let child = Worker::builder("child", NoopRoutine).build();
        worker.add_dependent("child", child.clone()).await.unwrap();
        let mut rx = worker.subscribe();

        worker.start().await.unwrap();
        wait_for_state(&worker, WorkerState::Started).await;
        wait_for_state(&child, WorkerState::Started).await;

        // the run died without its own teardown; stop settles it anyway
        worker.stop().await;
        assert_eq!(worker.state(), WorkerState::Stopped);
        assert_eq!(child.state(), WorkerState::Stopped);
        assert!(drain(&mut rx)
            .iter()
            .any(|e| e.kind == EventKind::CycleFailed));

        // and the worker remains usable afterwards
        worker.start().await.unwrap();
        wait_for_state(&worker, WorkerState::Started).await;
        worker.stop().await;
        assert_eq!(worker.state(), WorkerState::Stopped);
    }

    #[tokio::test]
    async fn test_panicking_hook_is_settled_by_shutdown() {
        let probe = Arc::new(Probe {
            panic_hook: true,
            ..Probe::default()
        });
        let worker = probe_worker(&probe);

        worker.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        // the run died in Starting, where stop is a contractual no-op
        assert_eq!(worker.state(), WorkerState::Starting);
        worker.stop().await;
        assert_eq!(worker.state(), WorkerState::Starting);

        worker.shutdown().await;
        assert_eq!(worker.state(), WorkerState::Stopped);
        assert!(worker.is_disposed());
    }

    #[tokio::test]
    async fn test_lifecycle_events_are_published_in_order() {
        let probe = Arc::new(Probe::default());
        let worker = probe_worker(&probe);
        let mut rx = worker.subscribe();

        worker.start().await.unwrap();
        wait_for_state(&worker, WorkerState::Started).await;
        worker.stop().await;

        let kinds: Vec<EventKind> = drain(&mut rx).iter().map(|e| e.kind).collect();
        let expect = [
            EventKind::WorkerStarting,
            EventKind::WorkerStarted,
            EventKind::WorkerStopping,
            EventKind::WorkerStopped,
        ];
        let mut it = kinds.iter();
        for want in expect {
            assert!(
                it.any(|k| *k == want),
                "missing {want:?} in published order {kinds:?}"
            );
        }
    }
}
