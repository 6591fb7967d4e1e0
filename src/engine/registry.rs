// src/engine/registry.rs

//! Registry of launched processes, keyed by alias name.
//!
//! ## Rules
//! - A handle is inserted *before* its process is spawned, under the same
//!   lock that guards the stopping flag. The cascade flips the flag and
//!   snapshots under that lock, so it never misses a process and never
//!   signals one that is not registered.
//! - Once stopping, no launch is admitted.
//! - Terminal handles are pruned when the same alias launches again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::process::Child;

use crate::errors::Result;
use crate::exec::command::LaunchSpec;
use crate::exec::process::ProcessHandle;

#[derive(Debug, Default)]
struct Inner {
    stopping: bool,
    processes: HashMap<String, Vec<Arc<ProcessHandle>>>,
}

#[derive(Debug, Default)]
pub struct Registry {
    inner: Mutex<Inner>,
    stopping: AtomicBool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register and spawn one launch of `spec`.
    ///
    /// Returns `Ok(None)` when the registry is stopping; nothing is spawned
    /// in that case. A spawn failure leaves a terminal `LaunchFailed` handle
    /// registered and returns the error.
    pub fn launch(
        &self,
        spec: &LaunchSpec,
        generation: u32,
    ) -> Result<Option<(Arc<ProcessHandle>, Child)>> {
        let mut inner = self.lock();
        if inner.stopping {
            return Ok(None);
        }

        let handle = ProcessHandle::starting(&spec.alias, generation, spec.restart);
        let entry = inner.processes.entry(spec.alias.clone()).or_default();
        entry.retain(|h| !h.is_terminal());
        entry.push(Arc::clone(&handle));

        let child = handle.spawn(spec)?;
        Ok(Some((handle, child)))
    }

    /// Track an alias that failed before it could be spawned.
    pub fn record_failure(&self, alias: &str) {
        self.lock()
            .processes
            .entry(alias.to_string())
            .or_default()
            .push(ProcessHandle::launch_failed(alias));
    }

    /// Flip the stopping flag and return every tracked handle.
    ///
    /// Irreversible. Later calls return a fresh snapshot.
    pub fn begin_stopping(&self) -> Vec<Arc<ProcessHandle>> {
        let mut inner = self.lock();
        inner.stopping = true;
        self.stopping.store(true, Ordering::SeqCst);
        inner.processes.values().flatten().cloned().collect()
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// All tracked handles, terminal or not.
    pub fn snapshot(&self) -> Vec<Arc<ProcessHandle>> {
        self.lock().processes.values().flatten().cloned().collect()
    }

    /// Handles that have not reached a terminal state.
    pub fn live(&self) -> Vec<Arc<ProcessHandle>> {
        self.snapshot()
            .into_iter()
            .filter(|h| !h.is_terminal())
            .collect()
    }

    /// Tracked handles for one alias.
    pub fn handles_for(&self, alias: &str) -> Vec<Arc<ProcessHandle>> {
        self.lock()
            .processes
            .get(alias)
            .cloned()
            .unwrap_or_default()
    }
}
