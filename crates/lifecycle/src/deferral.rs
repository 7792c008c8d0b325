//! Suspend deferrals
//!
//! While a suspend deferral is held, the host waits before freezing the
//! process. It must be completed exactly once, and quickly: a host that runs
//! out of patience terminates the process instead.

use std::time::Duration;
use tokio::sync::oneshot;

/// Host-supplied permission to delay suspension.
///
/// `complete` consumes the token, so a token can only be completed once.
pub trait Deferral: Send {
    fn complete(self);
}

/// Outcome observed by the host side of a [`SuspendDeferral`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferralStatus {
    Completed,
    /// Token dropped without being completed
    Abandoned,
    /// Grace period elapsed first
    TimedOut,
}

/// Channel-backed deferral token
#[derive(Debug)]
pub struct SuspendDeferral {
    tx: oneshot::Sender<()>,
}

impl SuspendDeferral {
    /// Create a token and the waiter the host keeps
    pub fn new() -> (Self, DeferralWaiter) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, DeferralWaiter { rx })
    }
}

impl Deferral for SuspendDeferral {
    fn complete(self) {
        // The host may have stopped waiting already.
        let _ = self.tx.send(());
    }
}

/// Host side of a [`SuspendDeferral`]
#[derive(Debug)]
pub struct DeferralWaiter {
    rx: oneshot::Receiver<()>,
}

impl DeferralWaiter {
    /// Wait for completion for at most `grace`
    pub async fn wait(self, grace: Duration) -> DeferralStatus {
        match tokio::time::timeout(grace, self.rx).await {
            Ok(Ok(())) => DeferralStatus::Completed,
            Ok(Err(_)) => DeferralStatus::Abandoned,
            Err(_) => DeferralStatus::TimedOut,
        }
    }
}

/// Owns a deferral for the length of a suspend sequence and completes it on
/// every exit path, unwinding included.
#[derive(Debug)]
pub struct DeferralGuard<D: Deferral> {
    token: Option<D>,
}

impl<D: Deferral> DeferralGuard<D> {
    pub fn new(token: D) -> Self {
        Self { token: Some(token) }
    }

    /// Complete the deferral now
    pub fn complete(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(token) = self.token.take() {
            token.complete();
            tracing::debug!("Suspend deferral completed");
        }
    }
}

impl<D: Deferral> Drop for DeferralGuard<D> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDeferral(Arc<AtomicUsize>);

    impl Deferral for CountingDeferral {
        fn complete(self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_guard_completes_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let guard = DeferralGuard::new(CountingDeferral(count.clone()));
        guard.complete();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_completes_on_drop() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let _guard = DeferralGuard::new(CountingDeferral(count.clone()));
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_completes_on_unwind() {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();

        let result = std::panic::catch_unwind(move || {
            let _guard = DeferralGuard::new(CountingDeferral(inner));
            panic!("hook blew up");
        });

        assert!(result.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_waiter_sees_completion() {
        let (token, waiter) = SuspendDeferral::new();
        DeferralGuard::new(token).complete();
        assert_eq!(
            waiter.wait(Duration::from_secs(1)).await,
            DeferralStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_waiter_sees_abandoned_token() {
        let (token, waiter) = SuspendDeferral::new();
        drop(token);
        assert_eq!(
            waiter.wait(Duration::from_secs(1)).await,
            DeferralStatus::Abandoned
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_times_out() {
        let (_token, waiter) = SuspendDeferral::new();
        assert_eq!(
            waiter.wait(Duration::from_millis(50)).await,
            DeferralStatus::TimedOut
        );
    }
}
