//! One-shot initialization gate

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use once_cell::sync::Lazy;

use crate::error::{LifecycleError, Result};
use crate::hooks::LifecycleHooks;

/// Gate shared by every coordinator in this process
static PROCESS_GATE: Lazy<Arc<InitializationGate>> =
    Lazy::new(|| Arc::new(InitializationGate::new()));

/// First-writer-wins latch: only the caller that moves the counter from 0 to 1
/// gets to run `on_initialized`.
#[derive(Debug, Default)]
pub struct InitializationGate {
    attempts: AtomicUsize,
}

impl InitializationGate {
    pub const fn new() -> Self {
        Self {
            attempts: AtomicUsize::new(0),
        }
    }

    /// The process-wide gate
    pub fn process() -> Arc<InitializationGate> {
        Arc::clone(&PROCESS_GATE)
    }

    /// Count this attempt; true only for the very first one
    pub fn try_open(&self) -> bool {
        self.attempts.fetch_add(1, Ordering::AcqRel) == 0
    }

    /// Run `on_initialized` if this is the first attempt ever.
    ///
    /// Returns whether the hook ran. A failing hook still consumes the gate.
    pub fn ensure_initialized_once<H>(&self, hooks: &H) -> Result<bool>
    where
        H: LifecycleHooks + ?Sized,
    {
        if !self.try_open() {
            return Ok(false);
        }

        tracing::debug!("Running on_initialized");
        hooks
            .on_initialized()
            .map_err(|source| LifecycleError::hook("on_initialized", source))?;
        Ok(true)
    }

    pub fn is_open(&self) -> bool {
        self.attempts.load(Ordering::Acquire) > 0
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Acquire)
    }
}
