//! # Example: basic_worker
//!
//! Minimal example of a single worker: build, start, observe a few cycles,
//! stop, dispose.
//!
//! Demonstrates how to:
//! - Define a cycle using [`RoutineFn`].
//! - Drive the `Stopped → Starting → Started → Stopping → Stopped` round trip.
//! - Release the worker's resources with `shutdown()`.
//!
//! ## Run
//! ```bash
//! cargo run --example basic_worker
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use workvisor::{RoutineError, RoutineFn, Worker};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ticker = Worker::builder(
        "ticker",
        RoutineFn::new(|ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                return Err(RoutineError::Canceled);
            }
            println!("[ticker] tick");
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(())
        }),
    )
    .build();

    println!("state after build: {:?}", ticker.state());

    ticker.start().await?;
    tokio::time::sleep(Duration::from_millis(350)).await;

    ticker.stop().await;
    println!("state after stop: {:?}", ticker.state());

    ticker.shutdown().await;
    println!("disposed: {}", ticker.is_disposed());
    Ok(())
}
