//! Coordinator configuration
//!
//! Loaded from `lifecycle.toml` in the user config directory; every field
//! has a default so a missing or partial file is fine.

use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{LifecycleError, Result};
use crate::marker::DEFAULT_MARKER_KEY;
use crate::telemetry::LogLevel;

/// Lifecycle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Store key holding the suspend marker
    pub marker_key: String,
    /// Marker store file; defaults to the local data directory
    pub store_path: Option<PathBuf>,
    pub log_level: LogLevel,
    /// Panic (debug builds only) when a start sequence fails
    pub break_on_start_failure: bool,
    /// How long the host waits for a suspend deferral
    pub suspend_grace_period_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            marker_key: DEFAULT_MARKER_KEY.into(),
            store_path: None,
            log_level: LogLevel::Info,
            break_on_start_failure: false,
            suspend_grace_period_ms: 5000,
        }
    }
}

impl LifecycleConfig {
    /// Load configuration from disk or return defaults
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| LifecycleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| LifecycleError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.marker_key.trim().is_empty() {
            return Err(LifecycleError::Config("marker_key must not be empty".into()));
        }
        Ok(())
    }

    pub fn suspend_grace_period(&self) -> Duration {
        Duration::from_millis(self.suspend_grace_period_ms)
    }

    /// Configured store path, or the default one
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(default_store_path)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lifecycle")
            .join("lifecycle.toml")
    }
}

/// Default location of the persisted marker store
pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lifecycle")
        .join("local_settings.json")
}
