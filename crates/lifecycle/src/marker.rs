//! Suspend marker
//!
//! A single persisted slot holding the time of the last suspend. It is present
//! only while the process has suspended without a clean resume since.

use std::sync::Arc;
use chrono::{DateTime, Local, SecondsFormat};

use crate::error::Result;
use crate::store::MarkerStore;

/// Key used when the configuration does not name one
pub const DEFAULT_MARKER_KEY: &str = "Suspend_Data";

/// Suspend marker backed by a [`MarkerStore`]
#[derive(Clone)]
pub struct SuspendMarker {
    store: Arc<dyn MarkerStore>,
    key: String,
}

impl SuspendMarker {
    pub fn new(store: Arc<dyn MarkerStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the key exists, regardless of whether its value parses
    pub fn is_present(&self) -> Result<bool> {
        self.store.contains(&self.key)
    }

    /// Read the marker timestamp; unparsable values read as absent
    pub fn read(&self) -> Result<Option<DateTime<Local>>> {
        let Some(raw) = self.store.try_get(&self.key)? else {
            return Ok(None);
        };

        Ok(self.parse_logged(&raw))
    }

    fn parse_logged(&self, raw: &str) -> Option<DateTime<Local>> {
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            tracing::warn!(key = %self.key, value = %raw, "Ignoring malformed suspend marker");
        }
        parsed
    }

    /// Replace the marker with `at` in a single overwrite; a failed write
    /// leaves the previous marker in place
    pub fn mark(&self, at: DateTime<Local>) -> Result<()> {
        self.store.set(&self.key, &format_timestamp(at))
    }

    /// Remove the marker; returns whether one was present
    pub fn clear(&self) -> Result<bool> {
        Ok(self.store.remove(&self.key)?.is_some())
    }

    /// Remove the marker and parse what it held, in one store operation
    pub fn take(&self) -> Result<Option<DateTime<Local>>> {
        let Some(raw) = self.store.remove(&self.key)? else {
            return Ok(None);
        };
        Ok(self.parse_logged(&raw))
    }
}

impl std::fmt::Debug for SuspendMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuspendMarker").field("key", &self.key).finish()
    }
}

fn format_timestamp(at: DateTime<Local>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|at| at.with_timezone(&Local))
}
