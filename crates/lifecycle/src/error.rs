//! Lifecycle error types

use std::fmt;

/// Which lifecycle sequence an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Start,
    Suspend,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Suspend => write!(f, "suspend"),
        }
    }
}

/// Lifecycle error
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Marker store error: {0}")]
    Store(String),
    #[error("Hook `{hook}` failed: {source}")]
    Hook {
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("Panic during {stage} sequence: {message}")]
    Panicked { stage: Stage, message: String },
    #[error("Surface activation failed: {0}")]
    Surface(#[source] anyhow::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl LifecycleError {
    pub fn hook(hook: &'static str, source: anyhow::Error) -> Self {
        Self::Hook { hook, source }
    }

    /// Build a panic error from an unwind payload
    pub fn panicked(stage: Stage, payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        Self::Panicked { stage, message }
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_message() {
        let err = LifecycleError::panicked(Stage::Start, Box::new("boom"));
        assert_eq!(err.to_string(), "Panic during start sequence: boom");

        let err = LifecycleError::panicked(Stage::Suspend, Box::new(String::from("owned")));
        assert_eq!(err.to_string(), "Panic during suspend sequence: owned");

        let err = LifecycleError::panicked(Stage::Start, Box::new(42_u32));
        assert_eq!(err.to_string(), "Panic during start sequence: Unknown panic");
    }

    #[test]
    fn test_hook_error_keeps_source() {
        let err = LifecycleError::hook("on_start", anyhow::anyhow!("no database"));
        assert_eq!(err.to_string(), "Hook `on_start` failed: no database");
        assert!(std::error::Error::source(&err).is_some());
    }
}
