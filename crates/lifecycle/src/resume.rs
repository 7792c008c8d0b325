//! Resume detection
//!
//! The host may terminate a suspended process to reclaim memory. When the
//! app is launched again it must behave as if it resumed, so the previous
//! suspend marker is reconciled against the launch payload here.

use crate::args::{ActivationPayload, ExecutionState, ResumeArgs, StartArgs, StartKind};
use crate::error::Result;
use crate::marker::SuspendMarker;

/// Decide whether `args` should run as a resume.
///
/// - A launch reporting `Terminated` while a marker is present becomes a
///   `Resume` with a synthesized payload, and the marker is cleared.
/// - A resume from `Suspended` clears the marker, since the process came
///   back cleanly.
/// - Everything else passes through untouched.
pub fn classify(mut args: StartArgs, marker: &SuspendMarker) -> Result<StartArgs> {
    if args.payload.is_resume_from_suspend() {
        if marker.clear()? {
            tracing::debug!("Cleared suspend marker on resume");
        }
        return Ok(args);
    }

    if !args.payload.is_terminated_launch() {
        return Ok(args);
    }

    // Removal and read are one store operation, so a concurrent suspend
    // either lands before (and is consumed) or after (and survives).
    // A malformed marker is removed but does not turn the launch into a resume.
    let Some(suspended_at) = marker.take()? else {
        return Ok(args);
    };

    tracing::info!(%suspended_at, "Launch after termination treated as resume");
    args.payload = ActivationPayload::Resumed(
        ResumeArgs::create(ExecutionState::Terminated).with_suspended_at(suspended_at),
    );
    args.kind = StartKind::Resume;
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use chrono::Local;

    use crate::args::{ActivatedArgs, ActivationKind, LaunchArgs};
    use crate::marker::DEFAULT_MARKER_KEY;
    use crate::store::{MarkerStore, MemoryStore};

    fn marker() -> (Arc<MemoryStore>, SuspendMarker) {
        let store = Arc::new(MemoryStore::new());
        let marker = SuspendMarker::new(store.clone(), DEFAULT_MARKER_KEY);
        (store, marker)
    }

    #[test]
    fn test_terminated_launch_with_marker_becomes_resume() {
        let (store, marker) = marker();
        let at = Local::now();
        marker.mark(at).unwrap();

        let args = StartArgs::launch(LaunchArgs::new(ExecutionState::Terminated));
        let classified = classify(args, &marker).unwrap();

        assert_eq!(classified.kind, StartKind::Resume);
        assert_eq!(
            classified.payload,
            ActivationPayload::Resumed(
                ResumeArgs::create(ExecutionState::Terminated).with_suspended_at(at)
            )
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_no_marker_leaves_args_unchanged() {
        let (_store, marker) = marker();

        let payloads = [
            StartArgs::launch(LaunchArgs::new(ExecutionState::Terminated)),
            StartArgs::launch(LaunchArgs::new(ExecutionState::NotRunning)),
            StartArgs::launch(LaunchArgs::new(ExecutionState::ClosedByUser).prelaunched()),
            StartArgs::activated(ActivatedArgs::new(
                ActivationKind::File,
                ExecutionState::Terminated,
            )),
        ];

        for args in payloads {
            assert_eq!(classify(args.clone(), &marker).unwrap(), args);
        }
    }

    #[test]
    fn test_marker_kept_for_non_terminated_launch() {
        let (store, marker) = marker();
        marker.mark(Local::now()).unwrap();

        let args = StartArgs::launch(LaunchArgs::new(ExecutionState::ClosedByUser));
        let classified = classify(args.clone(), &marker).unwrap();

        assert_eq!(classified, args);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_malformed_marker_is_dropped_without_resume() {
        let (store, marker) = marker();
        store.set(DEFAULT_MARKER_KEY, "garbage").unwrap();

        let args = StartArgs::launch(LaunchArgs::new(ExecutionState::Terminated));
        let classified = classify(args.clone(), &marker).unwrap();

        assert_eq!(classified, args);
        assert!(store.is_empty());
    }

    #[test]
    fn test_resume_from_suspend_clears_marker() {
        let (store, marker) = marker();
        marker.mark(Local::now()).unwrap();

        let args = StartArgs::resumed(ExecutionState::Suspended);
        let classified = classify(args.clone(), &marker).unwrap();

        assert_eq!(classified, args);
        assert!(store.is_empty());
    }
}
