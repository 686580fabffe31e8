//! # workvisor
//!
//! **Workvisor** is a lifecycle primitive for long-running background workers.
//!
//! It provides a controlled start/stop state machine, cooperative
//! cancellation, and hierarchical propagation of start/stop to dependent
//! workers. The crate is designed as a building block for daemons and
//! services that own long-lived background loops.
//!
//! ## Architecture
//! ```text
//!              ┌──────────────────────────────────────────────┐
//!              │ Worker ("parent")                            │
//! start() ───► │  - StateCell (Stopped/Starting/Started/..)   │
//! stop()  ───► │  - run slot (JoinHandle + CancellationToken) │
//!              │  - DependentRegistry                         │
//!              │  - Bus (broadcast events)                    │
//!              └───────┬──────────────────────────┬───────────┘
//!                      │ spawns                   │ cascades start/stop
//!                      ▼                          ▼
//!              ┌──────────────┐        ┌──────────────┐ ┌──────────────┐
//!              │ run loop     │        │ Worker "dep1"│ │ Worker "dep2"│
//!              │ (one task)   │        └──────────────┘ └──────────────┘
//!              └──────┬───────┘
//!                     │ invokes, never concurrently
//!                     ▼
//!          Routine::on_run_starting ─► Routine::cycle ×N ─► Routine::on_run_ending
//! ```
//!
//! ### Lifecycle
//! ```text
//! start():
//!   Stopped ──► Starting (guarded; one spawn) ──► execution context:
//!     ├─► on_run_starting(ctx)
//!     ├─► dependents.start_all()
//!     ├─► Started
//!     └─► loop {
//!           ├─► cancellation check (every cycle is a cancellation point)
//!           └─► cycle(ctx)
//!         }
//!
//! stop():
//!   Started ──► Stopping (guarded; one teardown)
//!     ├─► wait up to grace for the loop to exit on its own
//!     ├─► else force-raise the cancellation token
//!     └─► teardown (always runs, failures included):
//!           dependents.stop_all() ──► on_run_ending() ──► Stopped
//!
//! shutdown():
//!   one-shot: stop() + release run handle and token; start() refused forever
//! ```
//!
//! ## Features
//! | Area             | Description                                                  | Key types / traits                    |
//! |------------------|--------------------------------------------------------------|---------------------------------------|
//! | **Lifecycle**    | Start/stop state machine with idempotent transitions.        | [`Worker`], [`WorkerState`]           |
//! | **Routines**     | Extension points a concrete worker implements.               | [`Routine`], [`RoutineFn`]            |
//! | **Dependents**   | Case-insensitive registry with cascading start/stop.         | [`DependentRegistry`]                 |
//! | **Events**       | Broadcast lifecycle events with ordering guarantees.         | [`Event`], [`EventKind`], [`Bus`]     |
//! | **Subscribers**  | Hook into lifecycle events (logging, metrics, custom).       | [`Subscribe`]                         |
//! | **Errors**       | Typed usage and routine errors.                              | [`WorkerError`], [`RoutineError`]     |
//! | **Configuration**| Per-worker grace period and bus capacity.                    | [`WorkerConfig`]                      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use workvisor::{RoutineError, RoutineFn, Worker, WorkerState};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // A cycle that does one unit of work and honors cancellation.
//!     let poller = Worker::builder(
//!         "poller",
//!         RoutineFn::new(|ctx: CancellationToken| async move {
//!             if ctx.is_cancelled() {
//!                 return Err(RoutineError::Canceled);
//!             }
//!             tokio::time::sleep(Duration::from_millis(1)).await;
//!             Ok(())
//!         }),
//!     )
//!     .build();
//!
//!     poller.start().await?;
//!     tokio::time::sleep(Duration::from_millis(10)).await;
//!     poller.stop().await;
//!     assert_eq!(poller.state(), WorkerState::Stopped);
//!
//!     poller.shutdown().await; // release the run handle; start() now refused
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod events;
pub mod signal;
mod state;
pub mod subscribers;
mod worker;

// ---- Public re-exports ----

pub use config::WorkerConfig;
pub use error::{RoutineError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use state::WorkerState;
pub use subscribers::Subscribe;
pub use worker::{
    DependentRegistry, NoopRoutine, Routine, RoutineFn, RoutineRef, Worker, WorkerBuilder,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
