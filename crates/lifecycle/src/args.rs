//! Start arguments and activation payloads
//!
//! Every trigger the host fires (launch, reactivation, resume) is normalised
//! into a [`StartArgs`] before it enters the start sequence.

use std::fmt;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// How the previous run of the application ended, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExecutionState {
    #[default]
    NotRunning,
    Running,
    Suspended,
    Terminated,
    ClosedByUser,
}

/// Why a start sequence is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartKind {
    Launch,
    Activate,
    Resume,
    Prelaunch,
    Background,
}

impl fmt::Display for StartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Launch => "launch",
            Self::Activate => "activate",
            Self::Resume => "resume",
            Self::Prelaunch => "prelaunch",
            Self::Background => "background",
        };
        f.write_str(name)
    }
}

/// Kind of secondary activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationKind {
    File,
    Protocol,
    CommandLine,
    ShareTarget,
    Search,
    ToastNotification,
    Background,
    Other,
}

/// Payload of a primary launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchArgs {
    /// Raw launch arguments
    pub arguments: String,
    /// Tile or shortcut that launched the app
    pub tile_id: Option<String>,
    pub previous_state: ExecutionState,
    /// Launched ahead of time by the host, not by the user
    pub prelaunch: bool,
}

impl LaunchArgs {
    pub fn new(previous_state: ExecutionState) -> Self {
        Self {
            arguments: String::new(),
            tile_id: None,
            previous_state,
            prelaunch: false,
        }
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    pub fn with_tile_id(mut self, tile_id: impl Into<String>) -> Self {
        self.tile_id = Some(tile_id.into());
        self
    }

    pub fn prelaunched(mut self) -> Self {
        self.prelaunch = true;
        self
    }
}

/// Payload of a secondary activation (file, protocol, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedArgs {
    pub kind: ActivationKind,
    pub previous_state: ExecutionState,
    pub uri: Option<String>,
}

impl ActivatedArgs {
    pub fn new(kind: ActivationKind, previous_state: ExecutionState) -> Self {
        Self {
            kind,
            previous_state,
            uri: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// Payload synthesized for a resume, either from suspension or after the
/// host terminated a suspended process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeArgs {
    pub previous_state: ExecutionState,
    /// When the suspend marker was written, if known
    pub suspended_at: Option<DateTime<Local>>,
}

impl ResumeArgs {
    pub fn create(previous_state: ExecutionState) -> Self {
        Self {
            previous_state,
            suspended_at: None,
        }
    }

    pub fn with_suspended_at(mut self, at: DateTime<Local>) -> Self {
        self.suspended_at = Some(at);
        self
    }
}

/// Activation payload, polymorphic over the trigger that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationPayload {
    Launch(LaunchArgs),
    Activated(ActivatedArgs),
    Resumed(ResumeArgs),
}

impl ActivationPayload {
    pub fn previous_state(&self) -> ExecutionState {
        match self {
            Self::Launch(args) => args.previous_state,
            Self::Activated(args) => args.previous_state,
            Self::Resumed(args) => args.previous_state,
        }
    }

    /// A primary launch after the host terminated the previous run
    pub fn is_terminated_launch(&self) -> bool {
        matches!(self, Self::Launch(args) if args.previous_state == ExecutionState::Terminated)
    }

    /// A resume of a process that survived suspension
    pub fn is_resume_from_suspend(&self) -> bool {
        matches!(self, Self::Resumed(args) if args.previous_state == ExecutionState::Suspended)
    }
}

/// Arguments of one start sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartArgs {
    pub payload: ActivationPayload,
    pub kind: StartKind,
}

impl StartArgs {
    pub fn new(payload: ActivationPayload, kind: StartKind) -> Self {
        Self { payload, kind }
    }

    /// Primary launch; prelaunches keep their own kind
    pub fn launch(args: LaunchArgs) -> Self {
        let kind = if args.prelaunch {
            StartKind::Prelaunch
        } else {
            StartKind::Launch
        };
        Self::new(ActivationPayload::Launch(args), kind)
    }

    pub fn activated(args: ActivatedArgs) -> Self {
        let kind = match args.kind {
            ActivationKind::Background => StartKind::Background,
            _ => StartKind::Activate,
        };
        Self::new(ActivationPayload::Activated(args), kind)
    }

    pub fn resumed(previous_state: ExecutionState) -> Self {
        Self::new(
            ActivationPayload::Resumed(ResumeArgs::create(previous_state)),
            StartKind::Resume,
        )
    }
}

impl fmt::Display for StartArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (previous state: {:?})",
            self.kind,
            self.payload.previous_state()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_kind() {
        let args = StartArgs::launch(LaunchArgs::new(ExecutionState::NotRunning));
        assert_eq!(args.kind, StartKind::Launch);

        let args = StartArgs::launch(LaunchArgs::new(ExecutionState::NotRunning).prelaunched());
        assert_eq!(args.kind, StartKind::Prelaunch);
    }

    #[test]
    fn test_activation_kind() {
        let args = StartArgs::activated(
            ActivatedArgs::new(ActivationKind::Protocol, ExecutionState::Running)
                .with_uri("app://open"),
        );
        assert_eq!(args.kind, StartKind::Activate);

        let args = StartArgs::activated(ActivatedArgs::new(
            ActivationKind::Background,
            ExecutionState::NotRunning,
        ));
        assert_eq!(args.kind, StartKind::Background);
    }

    #[test]
    fn test_terminated_launch_detection() {
        let terminated = ActivationPayload::Launch(LaunchArgs::new(ExecutionState::Terminated));
        assert!(terminated.is_terminated_launch());

        let suspended = ActivationPayload::Launch(LaunchArgs::new(ExecutionState::Suspended));
        assert!(!suspended.is_terminated_launch());

        // Only primary launches count
        let activated = ActivationPayload::Activated(ActivatedArgs::new(
            ActivationKind::File,
            ExecutionState::Terminated,
        ));
        assert!(!activated.is_terminated_launch());
    }

    #[test]
    fn test_resumed_args() {
        let args = StartArgs::resumed(ExecutionState::Suspended);
        assert_eq!(args.kind, StartKind::Resume);
        assert!(args.payload.is_resume_from_suspend());
        assert_eq!(args.to_string(), "resume (previous state: Suspended)");
    }
}
