//! Worker core: state machine, extension points, dependent registry.
//!
//! This module contains the lifecycle primitive itself. The public API is
//! [`Worker`]/[`WorkerBuilder`], the [`Routine`] extension-point trait with
//! its helpers, and the [`DependentRegistry`] a worker cascades start/stop
//! onto.
//!
//! Internal layout:
//! - [`core`]: the `Worker` state machine, two-phase stop, and disposal;
//! - [`routine`]: the `Routine` trait, `RoutineFn`, `NoopRoutine`;
//! - [`registry`]: the case-insensitive dependent registry.

mod core;
mod registry;
mod routine;

pub use self::core::{Worker, WorkerBuilder};
pub use registry::DependentRegistry;
pub use routine::{NoopRoutine, Routine, RoutineFn, RoutineRef};
