//! # Lifecycle Host
//!
//! Simulates a host platform driving an application through launch,
//! suspend, termination and relaunch, using a marker store on disk.

use std::path::Path;
use std::sync::Arc;
use async_trait::async_trait;
use anyhow::Result;

use lifecycle::event::{Initialized, ResumedAfterTermination, StartFailed, Started, Suspended};
use lifecycle::{
    ActivatedArgs, ActivationKind, DeferralStatus, ExecutionState, InitializationGate,
    JsonFileStore, LaunchArgs, LifecycleConfig, LifecycleCoordinator, LifecycleHooks, StartArgs,
    SuspendDeferral,
};

/// Application used by the simulation
struct DemoApp;

#[async_trait]
impl LifecycleHooks for DemoApp {
    fn on_initialized(&self) -> Result<()> {
        tracing::info!("App initialized");
        Ok(())
    }

    fn on_start(&self, args: &StartArgs) -> Result<()> {
        tracing::info!(%args, "App starting");
        Ok(())
    }

    async fn on_start_async(&self, _args: &StartArgs) -> Result<()> {
        // Restoring state, navigating to the first page, ...
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        Ok(())
    }

    async fn on_suspending_async(&self) -> Result<()> {
        tracing::info!("Saving session state");
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        Ok(())
    }
}

/// One simulated process
struct Process {
    coordinator: LifecycleCoordinator,
    config: LifecycleConfig,
}

impl Process {
    /// Spawn a process; each one gets its own initialization gate
    fn spawn(config: &LifecycleConfig, store_path: &Path) -> Result<Self> {
        let store = Arc::new(JsonFileStore::open(store_path)?);
        let coordinator = LifecycleCoordinator::builder(Arc::new(DemoApp), store)
            .config(config)
            .gate(Arc::new(InitializationGate::new()))
            .build();

        let events = coordinator.events();
        events.on(|_: &Initialized| tracing::debug!("event: initialized"));
        events.on(|e: &Started| tracing::info!(kind = %e.kind, "event: started"));
        events.on(|e: &StartFailed| tracing::warn!(message = %e.message, "event: start failed"));
        events.on(|e: &Suspended| tracing::info!(at = %e.at, "event: suspended"));
        events.on(|e: &ResumedAfterTermination| {
            tracing::info!(suspended_at = ?e.suspended_at, "event: resumed after termination")
        });

        Ok(Self {
            coordinator,
            config: config.clone(),
        })
    }

    /// Fire a suspend and wait for the deferral like a host would
    async fn suspend(&self) -> Result<DeferralStatus> {
        let (token, waiter) = SuspendDeferral::new();
        let (result, status) = tokio::join!(
            self.coordinator.suspend(token),
            waiter.wait(self.config.suspend_grace_period())
        );
        result?;
        Ok(status)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = LifecycleConfig::load_or_default()?;
    lifecycle::init_logging(config.log_level);

    let store_path = config.resolved_store_path();
    tracing::info!(path = %store_path.display(), "Using marker store");

    // First process: cold launch, a protocol activation, then suspension.
    {
        let process = Process::spawn(&config, &store_path)?;
        let (launch, activation) = tokio::join!(
            process
                .coordinator
                .launch(LaunchArgs::new(ExecutionState::NotRunning)),
            process.coordinator.activate(
                ActivatedArgs::new(ActivationKind::Protocol, ExecutionState::Running)
                    .with_uri("lifecycle://open")
            ),
        );
        tracing::info!(launch = ?launch.kind(), activation = ?activation.kind(), "First process started");

        let status = process.suspend().await?;
        tracing::info!(?status, "Suspend acknowledged; host terminates the process");
    }

    // Second process: the host relaunches after having terminated the first.
    let process = Process::spawn(&config, &store_path)?;
    let outcome = process
        .coordinator
        .launch(LaunchArgs::new(ExecutionState::Terminated))
        .await;
    tracing::info!(kind = ?outcome.kind(), "Relaunch classified");

    let status = process.suspend().await?;
    tracing::info!(?status, "Second process suspended");

    process.coordinator.resume().await;
    tracing::info!(
        starts = process.coordinator.start_count(),
        marker_present = process.coordinator.marker().is_present()?,
        "Simulation finished"
    );

    Ok(())
}
