//! Cooperative pause/stop control for a running crawl.
//!
//! The engine only reads the flags at its suspension points (between scroll
//! iterations, between card parses, inside the pause wait). Mutation happens
//! from the outside: the UI/CLI layer requests stop/pause and resumes after
//! the operator has cleared a CAPTCHA.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

const PAUSE_POLL_MS: u64 = 300;

#[derive(Debug, Clone, Default)]
pub struct PauseSignal {
    inner: Arc<Flags>,
}

#[derive(Debug, Default)]
struct Flags {
    stopped: AtomicBool,
    paused: AtomicBool,
}

impl PauseSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
    }

    pub fn request_pause(&self) {
        self.inner.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::SeqCst);
    }

    /// Clears both flags. The signal is scoped to one run; callers that
    /// reuse a handle across runs reset it before starting the next one.
    pub fn reset(&self) {
        self.inner.stopped.store(false, Ordering::SeqCst);
        self.inner.paused.store(false, Ordering::SeqCst);
    }

    pub fn should_stop(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::SeqCst)
    }

    /// Busy-waits while paused, re-checking at a short interval.
    /// Returns immediately once resumed or stopped.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.should_stop() {
            sleep(Duration::from_millis(PAUSE_POLL_MS)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_and_pause_flags() {
        let signal = PauseSignal::new();
        assert!(!signal.should_stop());
        assert!(!signal.is_paused());

        signal.request_pause();
        assert!(signal.is_paused());
        signal.resume();
        assert!(!signal.is_paused());

        signal.request_stop();
        assert!(signal.should_stop());
    }

    #[test]
    fn test_reset_clears_both_flags() {
        let signal = PauseSignal::new();
        signal.request_stop();
        signal.request_pause();

        signal.reset();
        assert!(!signal.should_stop());
        assert!(!signal.is_paused());
    }

    #[test]
    fn test_clones_share_state() {
        let signal = PauseSignal::new();
        let clone = signal.clone();
        clone.request_stop();
        assert!(signal.should_stop());
    }

    #[tokio::test]
    async fn test_wait_if_paused_returns_after_resume() {
        let signal = PauseSignal::new();
        signal.request_pause();

        let waiter = signal.clone();
        let handle = tokio::spawn(async move {
            waiter.wait_if_paused().await;
        });

        sleep(Duration::from_millis(100)).await;
        assert!(!handle.is_finished());

        signal.resume();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("wait_if_paused should return after resume")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_if_paused_unblocks_on_stop() {
        let signal = PauseSignal::new();
        signal.request_pause();

        let waiter = signal.clone();
        let handle = tokio::spawn(async move {
            waiter.wait_if_paused().await;
        });

        signal.request_stop();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("wait_if_paused should return after stop")
            .unwrap();
    }
}
