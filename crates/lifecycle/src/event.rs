//! Lifecycle event bus
//!
//! Type-keyed pub/sub so hosts and services can observe lifecycle
//! transitions without implementing hooks themselves. Handlers run inline
//! on the emitting task and must not block.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use chrono::{DateTime, Local};
use parking_lot::RwLock;

use crate::args::StartKind;

/// Base trait for all events
pub trait Event: Any + Send + Sync {
    /// Event name for debugging/logging
    fn name(&self) -> &'static str;
}

/// Type-erased event handler
type BoxedHandler = Box<dyn Fn(&dyn Any) + Send + Sync>;

/// Event emitter / event bus
pub struct EventEmitter {
    handlers: RwLock<HashMap<TypeId, Vec<BoxedHandler>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to an event type
    pub fn on<E: Event + 'static, F>(&self, handler: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<E>();
        let boxed: BoxedHandler = Box::new(move |any| {
            if let Some(event) = any.downcast_ref::<E>() {
                handler(event);
            }
        });

        self.handlers
            .write()
            .entry(type_id)
            .or_default()
            .push(boxed);
    }

    /// Emit an event to all subscribers
    pub fn emit<E: Event + 'static>(&self, event: E) {
        tracing::trace!(event = event.name(), "Emitting lifecycle event");

        if let Some(handlers) = self.handlers.read().get(&TypeId::of::<E>()) {
            for handler in handlers {
                handler(&event);
            }
        }
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("event_types", &self.handlers.read().len())
            .finish()
    }
}

// ============================================================================
// Lifecycle Events
// ============================================================================

/// `on_initialized` ran for this process
#[derive(Debug, Clone)]
pub struct Initialized;

impl Event for Initialized {
    fn name(&self) -> &'static str { "lifecycle.initialized" }
}

/// A start sequence completed and the surface was activated
#[derive(Debug, Clone)]
pub struct Started {
    pub kind: StartKind,
}

impl Event for Started {
    fn name(&self) -> &'static str { "lifecycle.started" }
}

/// A start sequence failed
#[derive(Debug, Clone)]
pub struct StartFailed {
    pub message: String,
}

impl Event for StartFailed {
    fn name(&self) -> &'static str { "lifecycle.start_failed" }
}

/// A launch was turned into a resume after the host terminated the process
#[derive(Debug, Clone)]
pub struct ResumedAfterTermination {
    pub suspended_at: Option<DateTime<Local>>,
}

impl Event for ResumedAfterTermination {
    fn name(&self) -> &'static str { "lifecycle.resumed_after_termination" }
}

/// A suspend sequence began
#[derive(Debug, Clone)]
pub struct Suspending;

impl Event for Suspending {
    fn name(&self) -> &'static str { "lifecycle.suspending" }
}

/// A suspend sequence completed without error
#[derive(Debug, Clone)]
pub struct Suspended {
    pub at: DateTime<Local>,
}

impl Event for Suspended {
    fn name(&self) -> &'static str { "lifecycle.suspended" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_reaches_matching_handlers() {
        let emitter = EventEmitter::new();
        let started = Arc::new(AtomicUsize::new(0));
        let suspended = Arc::new(AtomicUsize::new(0));

        let counter = started.clone();
        emitter.on(move |event: &Started| {
            assert_eq!(event.kind, StartKind::Launch);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = suspended.clone();
        emitter.on(move |_: &Suspending| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        emitter.emit(Started { kind: StartKind::Launch });
        emitter.emit(Started { kind: StartKind::Launch });

        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(suspended.load(Ordering::SeqCst), 0);
    }
}
