//! Lifecycle coordinator
//!
//! Serializes start sequences behind a single async lock and wraps suspend
//! sequences around the host's deferral token.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use chrono::{DateTime, Local};
use futures::FutureExt;
use tokio::sync::Mutex;

use crate::args::{ActivatedArgs, ActivationPayload, ExecutionState, LaunchArgs, StartArgs, StartKind};
use crate::config::LifecycleConfig;
use crate::deferral::{Deferral, DeferralGuard};
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{LifecycleError, Result, Stage};
use crate::event::{
    EventEmitter, Initialized, ResumedAfterTermination, StartFailed, Started, Suspended, Suspending,
};
use crate::gate::InitializationGate;
use crate::hooks::LifecycleHooks;
use crate::marker::{SuspendMarker, DEFAULT_MARKER_KEY};
use crate::resume;
use crate::store::MarkerStore;
use crate::surface::{HeadlessSurface, Surface};

/// A start sequence that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReport {
    /// Arguments after resume detection
    pub args: StartArgs,
    /// Whether this sequence ran `on_initialized`
    pub first_start: bool,
}

/// Result of a start sequence. Failures are reported, never propagated.
#[derive(Debug)]
pub enum StartOutcome {
    Started(StartReport),
    Failed(LifecycleError),
}

impl StartOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }

    pub fn kind(&self) -> Option<StartKind> {
        match self {
            Self::Started(report) => Some(report.args.kind),
            Self::Failed(_) => None,
        }
    }

    pub fn report(&self) -> Option<&StartReport> {
        match self {
            Self::Started(report) => Some(report),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&LifecycleError> {
        match self {
            Self::Started(_) => None,
            Self::Failed(error) => Some(error),
        }
    }
}

/// Coordinates start and suspend sequences for one application
pub struct LifecycleCoordinator {
    hooks: Arc<dyn LifecycleHooks>,
    marker: SuspendMarker,
    gate: Arc<InitializationGate>,
    start_lock: Mutex<()>,
    surface: Arc<dyn Surface>,
    sink: Arc<dyn DiagnosticSink>,
    events: Arc<EventEmitter>,
    completed_starts: AtomicU64,
}

impl LifecycleCoordinator {
    pub fn builder(
        hooks: Arc<dyn LifecycleHooks>,
        store: Arc<dyn MarkerStore>,
    ) -> CoordinatorBuilder {
        CoordinatorBuilder::new(hooks, store)
    }

    // ------------------------------------------------------------------
    // Host entry points
    // ------------------------------------------------------------------

    /// Primary launch
    pub async fn launch(&self, args: LaunchArgs) -> StartOutcome {
        self.run_start(StartArgs::launch(args)).await
    }

    /// Secondary activation while running or from a cold start
    pub async fn activate(&self, args: ActivatedArgs) -> StartOutcome {
        self.run_start(StartArgs::activated(args)).await
    }

    /// Resume of a process that survived suspension
    pub async fn resume(&self) -> StartOutcome {
        self.run_start(StartArgs::resumed(ExecutionState::Suspended)).await
    }

    /// Suspend; `token` is completed before this returns, on every path
    pub async fn suspend<D: Deferral>(&self, token: D) -> Result<()> {
        self.run_suspend(token).await
    }

    // ------------------------------------------------------------------
    // Start
    // ------------------------------------------------------------------

    /// Run one start sequence.
    ///
    /// Sequences are totally ordered by the start lock, which is held across
    /// every hook (awaits included) and released on every exit path. Hook
    /// errors and panics are reported to the diagnostic sink and returned in
    /// the outcome.
    pub async fn run_start(&self, args: StartArgs) -> StartOutcome {
        let result = {
            let _lock = self.start_lock.lock().await;
            tracing::debug!(%args, "Start sequence entered");

            let result = AssertUnwindSafe(self.start_sequence(args))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(LifecycleError::panicked(Stage::Start, payload)));

            match &result {
                Ok(report) => {
                    self.completed_starts.fetch_add(1, Ordering::SeqCst);
                    tracing::info!(kind = %report.args.kind, first_start = report.first_start, "Start sequence completed");
                    self.events.emit(Started { kind: report.args.kind });
                }
                Err(error) => {
                    self.sink.report(Stage::Start, error);
                    self.events.emit(StartFailed { message: error.to_string() });
                }
            }
            result
        };

        match result {
            Ok(report) => StartOutcome::Started(report),
            Err(error) => {
                self.sink.hard_stop(&error);
                StartOutcome::Failed(error)
            }
        }
    }

    async fn start_sequence(&self, args: StartArgs) -> Result<StartReport> {
        let first_start = self.gate.ensure_initialized_once(self.hooks.as_ref())?;
        if first_start {
            self.events.emit(Initialized);
        }

        let args = resume::classify(args, &self.marker)?;
        if let ActivationPayload::Resumed(resumed) = &args.payload {
            if resumed.previous_state == ExecutionState::Terminated {
                self.events.emit(ResumedAfterTermination {
                    suspended_at: resumed.suspended_at,
                });
            }
        }

        self.hooks
            .on_start(&args)
            .map_err(|source| LifecycleError::hook("on_start", source))?;
        self.hooks
            .on_start_async(&args)
            .await
            .map_err(|source| LifecycleError::hook("on_start_async", source))?;

        self.surface.activate().map_err(LifecycleError::Surface)?;

        Ok(StartReport { args, first_start })
    }

    // ------------------------------------------------------------------
    // Suspend
    // ------------------------------------------------------------------

    /// Run one suspend sequence.
    ///
    /// The deferral is completed exactly once whatever the hooks do; errors
    /// are reported and then returned, panics resume unwinding after the
    /// deferral is completed.
    pub async fn run_suspend<D: Deferral>(&self, token: D) -> Result<()> {
        let guard = DeferralGuard::new(token);
        let at = Local::now();
        tracing::debug!(%at, "Suspend sequence entered");
        self.events.emit(Suspending);

        let result = self.suspend_sequence(at).await;
        guard.complete();

        match &result {
            Ok(()) => {
                tracing::info!("Suspend sequence completed");
                self.events.emit(Suspended { at });
            }
            Err(error) => self.sink.report(Stage::Suspend, error),
        }
        result
    }

    async fn suspend_sequence(&self, at: DateTime<Local>) -> Result<()> {
        self.marker.mark(at)?;

        self.hooks
            .on_suspending()
            .map_err(|source| LifecycleError::hook("on_suspending", source))?;
        self.hooks
            .on_suspending_async()
            .await
            .map_err(|source| LifecycleError::hook("on_suspending_async", source))?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    /// Whether `on_initialized` has been attempted in this process
    pub fn is_initialized(&self) -> bool {
        self.gate.is_open()
    }

    /// Number of start sequences that completed successfully
    pub fn start_count(&self) -> u64 {
        self.completed_starts.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> &Arc<EventEmitter> {
        &self.events
    }

    pub fn marker(&self) -> &SuspendMarker {
        &self.marker
    }
}

impl std::fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("marker", &self.marker)
            .field("gate", &self.gate)
            .field("completed_starts", &self.start_count())
            .finish()
    }
}

/// Builder for [`LifecycleCoordinator`]
pub struct CoordinatorBuilder {
    hooks: Arc<dyn LifecycleHooks>,
    store: Arc<dyn MarkerStore>,
    marker_key: String,
    gate: Option<Arc<InitializationGate>>,
    surface: Option<Arc<dyn Surface>>,
    sink: Option<Arc<dyn DiagnosticSink>>,
    events: Option<Arc<EventEmitter>>,
}

impl CoordinatorBuilder {
    pub fn new(hooks: Arc<dyn LifecycleHooks>, store: Arc<dyn MarkerStore>) -> Self {
        Self {
            hooks,
            store,
            marker_key: DEFAULT_MARKER_KEY.to_string(),
            gate: None,
            surface: None,
            sink: None,
            events: None,
        }
    }

    /// Apply marker key and failure policy from configuration
    pub fn config(mut self, config: &LifecycleConfig) -> Self {
        self.marker_key = config.marker_key.clone();
        self.sink = Some(Arc::new(TracingSink::new(config.break_on_start_failure)));
        self
    }

    pub fn marker_key(mut self, key: impl Into<String>) -> Self {
        self.marker_key = key.into();
        self
    }

    /// Use a specific gate instead of the process-wide one
    pub fn gate(mut self, gate: Arc<InitializationGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn surface(mut self, surface: Arc<dyn Surface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn events(mut self, events: Arc<EventEmitter>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> LifecycleCoordinator {
        LifecycleCoordinator {
            hooks: self.hooks,
            marker: SuspendMarker::new(self.store, self.marker_key),
            gate: self.gate.unwrap_or_else(InitializationGate::process),
            start_lock: Mutex::new(()),
            surface: self
                .surface
                .unwrap_or_else(|| Arc::new(HeadlessSurface::new())),
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingSink::default())),
            events: self.events.unwrap_or_default(),
            completed_starts: AtomicU64::new(0),
        }
    }
}
