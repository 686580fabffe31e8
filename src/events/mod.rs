//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the worker run loop, `stop()`, `shutdown()`, and the
//!   registry mutators on `Worker`.
//! - **Consumers**: `Worker::subscribe()` receivers and subscriber tasks
//!   spawned via [`subscribers::attach`](crate::subscribers::attach).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
