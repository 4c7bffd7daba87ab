//! Resolve-once readiness signal.
//!
//! Replaces the original fixed-count "is the host API there yet" polling:
//! the injector resolves this exactly once when the page surface is up, and
//! every consumer awaits the same signal. Waits stay bounded so a page that
//! never finishes bootstrapping still abandons executions instead of
//! parking them forever.

use std::time::Duration;
use tokio::sync::watch;

/// How long an execution waits for the host surface before giving up.
/// Matches the original retry budget (20 attempts at 300 ms).
pub const HOST_READY_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Debug)]
pub struct Readiness {
    tx: watch::Sender<bool>,
}

impl Readiness {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Mark the host surface ready. Idempotent, and takes effect even when
    /// nobody is waiting yet.
    pub fn resolve(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait for readiness, up to `timeout`. `false` means the wait was
    /// abandoned.
    pub async fn wait(&self, timeout: Duration) -> bool {
        let mut rx = self.tx.subscribe();
        if *rx.borrow() {
            return true;
        }
        tokio::time::timeout(timeout, rx.wait_for(|ready| *ready))
            .await
            .map(|result| result.is_ok())
            .unwrap_or(false)
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolved_signal_returns_immediately() {
        let readiness = Readiness::new();
        readiness.resolve();
        assert!(readiness.wait(Duration::from_millis(1)).await);
    }

    #[tokio::test]
    async fn unresolved_signal_times_out() {
        let readiness = Readiness::new();
        assert!(!readiness.wait(Duration::from_millis(20)).await);
    }

    #[tokio::test]
    async fn late_resolution_wakes_waiters() {
        let readiness = std::sync::Arc::new(Readiness::new());
        let waiter = {
            let readiness = readiness.clone();
            tokio::spawn(async move { readiness.wait(Duration::from_secs(1)).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        readiness.resolve();
        assert!(waiter.await.unwrap());
    }
}
