//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [starting] worker=feed
//! [started] worker=feed
//! [cycle-failed] worker=feed err="connection reset"
//! [force-canceled] worker=feed
//! [stopping] worker=feed
//! [stopped] worker=feed
//! [disposed] worker=feed
//! [dependent-added] worker=feed key=parser
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let worker = e.worker.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::WorkerStarting => println!("[starting] worker={worker}"),
            EventKind::WorkerStarted => println!("[started] worker={worker}"),
            EventKind::WorkerStopping => println!("[stopping] worker={worker}"),
            EventKind::WorkerStopped => println!("[stopped] worker={worker}"),
            EventKind::CycleFailed => {
                println!("[cycle-failed] worker={worker} err={:?}", e.error)
            }
            EventKind::HookFailed => {
                println!("[hook-failed] worker={worker} err={:?}", e.error)
            }
            EventKind::ForceCanceled => println!("[force-canceled] worker={worker}"),
            EventKind::Disposed => println!("[disposed] worker={worker}"),
            EventKind::DependentAdded => {
                println!("[dependent-added] worker={worker} key={:?}", e.key)
            }
            EventKind::DependentRemoved => {
                println!("[dependent-removed] worker={worker} key={:?}", e.key)
            }
            EventKind::DependentStartFailed => {
                println!(
                    "[dependent-start-failed] worker={worker} key={:?} err={:?}",
                    e.key, e.error
                )
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
