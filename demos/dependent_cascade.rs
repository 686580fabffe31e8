//! # Example: dependent_cascade
//!
//! A parent worker that owns two dependents and cascades start/stop onto
//! them, with all three workers publishing onto one shared bus.
//!
//! ## Flow
//! ```text
//! parent.start()
//!   ├─► parent on_run_starting
//!   ├─► registry.start_all() ──► source.start(), sink.start()
//!   └─► parent Started
//! parent.stop()
//!   ├─► registry.stop_all()  ──► source.stop(), sink.stop()
//!   └─► parent on_run_ending, Stopped
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example dependent_cascade
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use workvisor::{Bus, NoopRoutine, RoutineError, RoutineFn, Worker};

fn pipeline_stage(name: &'static str, bus: Bus) -> Arc<Worker> {
    Worker::builder(
        name,
        RoutineFn::new(move |ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                return Err(RoutineError::Canceled);
            }
            println!("[{name}] working");
            tokio::time::sleep(Duration::from_millis(120)).await;
            Ok(())
        }),
    )
    .with_bus(bus)
    .build()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = Bus::new(64);
    let mut events = bus.subscribe();

    // the parent does no work of its own; it only owns the stages
    let parent = Worker::builder("pipeline", NoopRoutine)
        .with_bus(bus.clone())
        .build();
    parent
        .add_dependent("source", pipeline_stage("source", bus.clone()))
        .await?;
    parent
        .add_dependent("sink", pipeline_stage("sink", bus.clone()))
        .await?;

    parent.start().await?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    parent.stop().await;

    // every lifecycle transition of the whole tree, in order
    while let Ok(ev) = events.try_recv() {
        println!(
            "seq={:<3} kind={:?} worker={:?}",
            ev.seq, ev.kind, ev.worker
        );
    }
    Ok(())
}
