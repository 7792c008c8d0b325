//! Application lifecycle hooks

use async_trait::async_trait;
use anyhow::Result;

use crate::args::StartArgs;

/// Extension points the coordinator calls into.
///
/// Every method defaults to a no-op. Per start sequence the order is
/// `on_initialized` (at most once per process) → `on_start` → `on_start_async`;
/// per suspend sequence it is `on_suspending` → `on_suspending_async`.
#[async_trait]
pub trait LifecycleHooks: Send + Sync {
    /// Called once, before the first start sequence runs its start hooks
    fn on_initialized(&self) -> Result<()> {
        Ok(())
    }

    /// Called when a start sequence begins
    fn on_start(&self, _args: &StartArgs) -> Result<()> {
        Ok(())
    }

    /// Awaited after `on_start`; the start lock stays held meanwhile
    async fn on_start_async(&self, _args: &StartArgs) -> Result<()> {
        Ok(())
    }

    /// Called when the host is about to suspend the process
    fn on_suspending(&self) -> Result<()> {
        Ok(())
    }

    /// Awaited after `on_suspending`; the deferral stays held meanwhile
    async fn on_suspending_async(&self) -> Result<()> {
        Ok(())
    }
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl LifecycleHooks for NoopHooks {}
