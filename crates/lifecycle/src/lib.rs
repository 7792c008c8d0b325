//! # Lifecycle
//!
//! Application lifecycle coordination: exactly-once initialization,
//! serialized start sequences, resume-after-termination detection and
//! suspend deferrals that are always released.
//!
//! ```no_run
//! use std::sync::Arc;
//! use lifecycle::{ExecutionState, LaunchArgs, LifecycleCoordinator, MemoryStore, NoopHooks};
//!
//! # async fn run() {
//! let coordinator = LifecycleCoordinator::builder(
//!     Arc::new(NoopHooks),
//!     Arc::new(MemoryStore::new()),
//! )
//! .build();
//!
//! let outcome = coordinator.launch(LaunchArgs::new(ExecutionState::NotRunning)).await;
//! assert!(outcome.is_started());
//! # }
//! ```

pub mod args;
pub mod config;
pub mod coordinator;
pub mod deferral;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod gate;
pub mod hooks;
pub mod marker;
pub mod resume;
pub mod store;
pub mod surface;
pub mod telemetry;

pub use args::{
    ActivatedArgs, ActivationKind, ActivationPayload, ExecutionState, LaunchArgs, ResumeArgs,
    StartArgs, StartKind,
};
pub use config::{default_store_path, LifecycleConfig};
pub use coordinator::{CoordinatorBuilder, LifecycleCoordinator, StartOutcome, StartReport};
pub use deferral::{Deferral, DeferralGuard, DeferralStatus, DeferralWaiter, SuspendDeferral};
pub use diagnostics::{DiagnosticSink, TracingSink};
pub use error::{LifecycleError, Result, Stage};
pub use event::{Event, EventEmitter};
pub use gate::InitializationGate;
pub use hooks::{LifecycleHooks, NoopHooks};
pub use marker::{SuspendMarker, DEFAULT_MARKER_KEY};
pub use store::{JsonFileStore, MarkerStore, MemoryStore};
pub use surface::{HeadlessSurface, Surface};
pub use telemetry::{init_logging, LogLevel};
