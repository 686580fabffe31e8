//! # Example: forced_cancel
//!
//! A cycle that blocks far past the grace period, forcing `stop()` to
//! escalate: after the cooperative window expires, the cancellation token is
//! force-raised and the blocked cycle observes it via `select!`.
//!
//! ## Run
//! ```bash
//! cargo run --example forced_cancel
//! ```

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use workvisor::{EventKind, RoutineError, RoutineFn, Worker};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let stubborn = Worker::builder(
        "stubborn",
        RoutineFn::new(|ctx: CancellationToken| async move {
            println!("[stubborn] entering a long blocking wait");
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(3600)) => Ok(()),
                _ = ctx.cancelled() => {
                    println!("[stubborn] forced cancellation observed");
                    Err(RoutineError::Canceled)
                }
            }
        }),
    )
    .with_grace(Duration::from_millis(50))
    .build();

    let mut events = stubborn.subscribe();

    stubborn.start().await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let begin = Instant::now();
    stubborn.stop().await;
    println!("stop() returned after {:?}", begin.elapsed());

    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::ForceCanceled {
            println!("escalation recorded: {:?}", ev.kind);
        }
    }

    stubborn.shutdown().await;
    Ok(())
}
