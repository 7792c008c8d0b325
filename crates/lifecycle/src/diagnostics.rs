//! Diagnostic sink for lifecycle failures

use crate::error::{LifecycleError, Stage};

/// Receives lifecycle failures.
///
/// `report` is called for every failed start or suspend sequence.
/// `hard_stop` is the developer-facing trap raised after a failed start,
/// once the start lock has been released.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, stage: Stage, error: &LifecycleError);

    fn hard_stop(&self, _error: &LifecycleError) {}
}

/// Default sink: logs through `tracing`, optionally panicking on failed
/// starts in debug builds
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    break_on_start_failure: bool,
}

impl TracingSink {
    pub fn new(break_on_start_failure: bool) -> Self {
        Self {
            break_on_start_failure,
        }
    }
}

impl DiagnosticSink for TracingSink {
    fn report(&self, stage: Stage, error: &LifecycleError) {
        tracing::error!(%stage, error = %error, "Lifecycle sequence failed");
    }

    fn hard_stop(&self, error: &LifecycleError) {
        tracing::error!(
            error = %error,
            trap = self.break_on_start_failure,
            "Start failure escalated"
        );
        if self.break_on_start_failure && cfg!(debug_assertions) {
            panic!("start sequence failed: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_hard_stop_logs_escalation_without_trap() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingSink::default().hard_stop(&LifecycleError::Store("unavailable".into()));
        });

        let output = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert!(output.contains("ERROR"));
        assert!(output.contains("Start failure escalated"));
        assert!(output.contains("unavailable"));
    }

    #[test]
    fn test_tracing_sink_does_not_trap_by_default() {
        let sink = TracingSink::default();
        let err = LifecycleError::Store("unavailable".into());
        sink.report(Stage::Start, &err);
        sink.hard_stop(&err);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "start sequence failed")]
    fn test_tracing_sink_traps_when_enabled() {
        let sink = TracingSink::new(true);
        sink.hard_stop(&LifecycleError::Store("unavailable".into()));
    }
}
