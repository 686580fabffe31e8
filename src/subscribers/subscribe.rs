//! # Core subscriber trait and listener.
//!
//! `Subscribe` is the extension point for plugging custom event handlers into
//! a worker's bus. [`attach`] spawns the listener task that drives one
//! subscriber from a bus receiver.
//!
//! ## Contract
//! - A subscriber is driven by its own listener task; slow handlers do not
//!   block the publisher, they lag and skip old events instead.
//! - Lagged receivers continue from the oldest retained event; a closed bus
//!   ends the listener.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::events::{Bus, Event};

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated listener task. Implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Spawns a listener task that forwards bus events to `sub`.
///
/// The task runs until the bus is closed (all senders dropped). Dropping the
/// returned handle detaches the listener; call `abort()` to end it early.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use workvisor::{Bus, Event, Subscribe, subscribers};
///
/// struct Audit;
///
/// #[async_trait]
/// impl Subscribe for Audit {
///     async fn on_event(&self, _event: &Event) {
///         // write audit record...
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bus = Bus::new(16);
/// let listener = subscribers::attach(&bus, Arc::new(Audit));
/// listener.abort();
/// # }
/// ```
pub fn attach(bus: &Bus, sub: Arc<dyn Subscribe>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => sub.on_event(&ev).await,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}
