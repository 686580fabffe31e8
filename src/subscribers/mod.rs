//! # Event subscribers for worker lifecycle events.
//!
//! This module provides the [`Subscribe`] trait, the [`attach`] listener
//! helper, and a built-in stdout writer for handling events broadcast through
//! a worker's [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Worker ── publish(Event) ──► Bus ──► broadcast to all receivers
//!                                           │
//!                                           ├──► attach() listener ──► Subscribe::on_event(&Event)
//!                                           │                              │
//!                                           │                         ┌────┴────┬────────┐
//!                                           │                         ▼         ▼        ▼
//!                                           │                      LogWriter  Metrics  Custom
//!                                           │
//!                                           └──► Worker::subscribe() receiver (ad-hoc)
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use workvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct MetricsSubscriber;
//!
//! #[async_trait]
//! impl Subscribe for MetricsSubscriber {
//!     async fn on_event(&self, event: &Event) {
//!         match event.kind {
//!             EventKind::CycleFailed => {
//!                 // increment failure counter
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::{Subscribe, attach};
