//! # Per-worker configuration.
//!
//! Provides [`WorkerConfig`], the settings a [`Worker`](crate::Worker) is
//! built with.
//!
//! ## Field semantics
//! - `grace`: how long `stop()` waits for the execution context to wind down
//!   cooperatively before force-raising the cancellation signal.
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped by the Bus).

use std::time::Duration;

/// Configuration for a single worker instance.
///
/// ## Notes
/// All fields are public for flexibility. Prefer [`WorkerConfig::default`]
/// plus field updates, or the builder's `with_*` helpers.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Cooperative grace period for `stop()`.
    ///
    /// When a stop is requested:
    /// - The run loop is given up to `grace` to exit on its own.
    /// - If it has not finished by then, the cancellation signal is
    ///   force-raised and `stop()` keeps waiting for the loop to observe it.
    ///
    /// Well-behaved cycles exit within the grace period and never see forced
    /// cancellation.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events will
    /// observe `Lagged` and skip older items. Minimum value is 1.
    pub bus_capacity: usize,
}

impl WorkerConfig {
    /// Returns the bus capacity clamped to a minimum of 1.
    ///
    /// The `Bus` uses this value to avoid constructing an invalid channel.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for WorkerConfig {
    /// Default configuration:
    ///
    /// - `grace = 20ms` (short cooperative window; cycles are expected to
    ///   check cancellation often)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            grace: Duration::from_millis(20),
            bus_capacity: 1024,
        }
    }
}
