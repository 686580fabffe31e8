//! # Dependent-worker registry.
//!
//! [`DependentRegistry`] is a concurrency-safe, case-insensitive keyed
//! collection of child workers. A parent worker starts and stops every
//! registered dependent as part of its own run; it never creates or destroys
//! them.
//!
//! ## Rules
//! - Keys are unique under ASCII case-insensitive comparison; inserting a
//!   duplicate is rejected, never overwritten.
//! - Entries keep insertion order; the bulk cascade walks them in that order,
//!   but callers must not rely on the order for correctness.
//! - Every operation, reads included, takes the one lock per registry
//!   instance; the bulk operations hold it for their whole sweep.
//! - The registry indexes workers, it does not own their lifecycle: removing
//!   an entry (or dropping the registry) never disposes the dependent, and
//!   the cascade is start/stop only.
//!
//! The registry must stay acyclic: a worker registered (directly or
//! transitively) as its own dependent would deadlock the cascade.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::WorkerError;
use crate::worker::core::Worker;

struct Entry {
    key: String,
    worker: Arc<Worker>,
}

/// Case-insensitive keyed collection of dependent workers.
///
/// Obtained via [`Worker::dependents`](crate::Worker::dependents); the
/// convenience mutators [`Worker::add_dependent`](crate::Worker::add_dependent)
/// and [`Worker::remove_dependent`](crate::Worker::remove_dependent) also
/// publish registry events.
#[derive(Default)]
pub struct DependentRegistry {
    entries: Mutex<Vec<Entry>>,
}

impl DependentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dependent worker under a unique case-insensitive key.
    ///
    /// Returns `Ok(true)` if the worker was added, `Ok(false)` if the key is
    /// already present (the existing entry is left untouched), and
    /// `Err(WorkerError::EmptyKey)` for an empty key.
    ///
    /// # Example
    /// ```
    /// use workvisor::{NoopRoutine, Worker};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), workvisor::WorkerError> {
    /// let parent = Worker::builder("parent", NoopRoutine).build();
    /// let child = Worker::builder("child", NoopRoutine).build();
    ///
    /// assert!(parent.add_dependent("Child", child.clone()).await?);
    /// // case-insensitive duplicate is rejected, not overwritten
    /// assert!(!parent.add_dependent("CHILD", child).await?);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn add(&self, key: &str, worker: Arc<Worker>) -> Result<bool, WorkerError> {
        if key.is_empty() {
            return Err(WorkerError::EmptyKey);
        }
        let mut entries = self.entries.lock().await;
        if entries.iter().any(|e| e.key.eq_ignore_ascii_case(key)) {
            return Ok(false);
        }
        entries.push(Entry {
            key: key.to_string(),
            worker,
        });
        Ok(true)
    }

    /// Removes a dependent by key.
    ///
    /// Returns the removed worker, or `None` if the key is absent. Removal
    /// does not stop or dispose the dependent.
    pub async fn remove(&self, key: &str) -> Option<Arc<Worker>> {
        let mut entries = self.entries.lock().await;
        let idx = entries
            .iter()
            .position(|e| e.key.eq_ignore_ascii_case(key))?;
        Some(entries.remove(idx).worker)
    }

    /// Returns true if a dependent is registered under the key.
    pub async fn contains_key(&self, key: &str) -> bool {
        let entries = self.entries.lock().await;
        entries.iter().any(|e| e.key.eq_ignore_ascii_case(key))
    }

    /// Looks up a dependent by key.
    ///
    /// An absent key yields `None`, never a panic.
    pub async fn get(&self, key: &str) -> Option<Arc<Worker>> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .find(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.worker.clone())
    }

    /// Returns the registered keys in insertion order (original casing).
    pub async fn keys(&self) -> Vec<String> {
        let entries = self.entries.lock().await;
        entries.iter().map(|e| e.key.clone()).collect()
    }

    /// Number of registered dependents.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns true if no dependents are registered.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Starts every registered dependent, holding the registry lock for the
    /// whole sweep.
    ///
    /// A dependent that refuses to start (it was disposed) is reported in the
    /// returned list under its key; the sweep continues past it.
    pub async fn start_all(&self) -> Vec<(String, WorkerError)> {
        let entries = self.entries.lock().await;
        let mut failed = Vec::new();
        for e in entries.iter() {
            if let Err(err) = e.worker.start().await {
                failed.push((e.key.clone(), err));
            }
        }
        failed
    }

    /// Stops every registered dependent, holding the registry lock for the
    /// whole sweep.
    ///
    /// Each stop is the regular two-phase stop: cooperative grace period,
    /// then forced cancellation. Already-stopped dependents are no-ops.
    pub async fn stop_all(&self) {
        let entries = self.entries.lock().await;
        for e in entries.iter() {
            Box::pin(e.worker.stop()).await;
        }
    }
}
