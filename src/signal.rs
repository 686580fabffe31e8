//! # Running a worker until an OS termination signal.
//!
//! Provides [`run_until_signal`], an async helper that starts a worker,
//! waits for a termination signal, then stops and disposes it.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Other platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::sync::Arc;

use crate::error::WorkerError;
use crate::worker::Worker;

/// Starts the worker, waits for a termination signal, then stops and
/// disposes it.
///
/// Each call creates independent signal listeners.
///
/// # Errors
/// [`WorkerError::Disposed`] if the worker was already shut down; signal
/// registration failures are mapped to the process exiting the wait early
/// and still stop the worker.
pub async fn run_until_signal(worker: &Arc<Worker>) -> Result<(), WorkerError> {
    worker.start().await?;
    let _ = wait_for_termination().await;
    worker.stop().await;
    worker.shutdown().await;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_termination() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_termination() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
