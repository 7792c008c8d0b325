//! Presentation surface

use std::sync::atomic::{AtomicUsize, Ordering};
use anyhow::Result;

/// The window (or equivalent) the host shows once a start sequence succeeds
pub trait Surface: Send + Sync {
    fn activate(&self) -> Result<()>;
}

/// Surface with nothing to show; counts activations
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    activations: AtomicUsize,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }
}

impl Surface for HeadlessSurface {
    fn activate(&self) -> Result<()> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Surface activated");
        Ok(())
    }
}
