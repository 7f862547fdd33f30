//! Stop tokens
//!
//! Two capability-equivalent backends for the cross-context stop signal,
//! one per concurrency strategy. Both are monotonic: once triggered they
//! stay triggered for the rest of the run. `trigger` never blocks, so
//! either backend is safe to call from the signal-handler task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

/// Sentinel byte written on the stop channel.
const STOP_SENTINEL: u8 = b'!';

/// Polled stop token for the threaded strategy.
///
/// An atomically-settable flag, readable without blocking. Workers check
/// it before every receive attempt.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    triggered: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; safe from any task or thread.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }
}

/// Channel-backed stop token for the multiplexed strategy.
///
/// `trigger` pushes one sentinel into the channel, so the receiving half
/// wakes the relay's readiness wait immediately instead of being polled.
/// The flag is set as well, keeping `is_triggered` true after the sentinel
/// has been consumed.
#[derive(Debug, Clone)]
pub struct StopChannel {
    tx: mpsc::Sender<u8>,
    triggered: Arc<AtomicBool>,
}

/// Receiving half of the stop channel, owned by the relay loop.
#[derive(Debug)]
pub struct StopReceiver {
    rx: mpsc::Receiver<u8>,
}

impl StopChannel {
    pub fn new() -> (Self, StopReceiver) {
        let (tx, rx) = mpsc::channel(1);
        (
            Self {
                tx,
                triggered: Arc::new(AtomicBool::new(false)),
            },
            StopReceiver { rx },
        )
    }

    /// Idempotent; never blocks. A full channel means a sentinel is
    /// already in flight, which is triggered enough.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Release);
        let _ = self.tx.try_send(STOP_SENTINEL);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }
}

impl StopReceiver {
    /// Resolve when a sentinel arrives, consuming it. Also resolves if
    /// every trigger handle has been dropped, which is treated as a stop
    /// request. Cancel-safe: one more source in a readiness wait.
    pub async fn triggered(&mut self) {
        let _ = self.rx.recv().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_starts_armed() {
        let flag = StopFlag::new();
        assert!(!flag.is_triggered());
    }

    #[test]
    fn flag_is_monotonic_and_idempotent() {
        let flag = StopFlag::new();
        flag.trigger();
        flag.trigger();
        assert!(flag.is_triggered());
        assert!(flag.clone().is_triggered());
    }

    #[tokio::test]
    async fn channel_trigger_wakes_receiver() {
        let (stop, mut rx) = StopChannel::new();
        stop.trigger();
        tokio::time::timeout(std::time::Duration::from_secs(1), rx.triggered())
            .await
            .expect("receiver should wake immediately");
        assert!(stop.is_triggered());
    }

    #[tokio::test]
    async fn channel_stays_triggered_after_consume() {
        let (stop, mut rx) = StopChannel::new();
        stop.trigger();
        rx.triggered().await;
        assert!(stop.is_triggered());
    }

    #[test]
    fn channel_double_trigger_does_not_block() {
        let (stop, _rx) = StopChannel::new();
        stop.trigger();
        stop.trigger();
        stop.trigger();
        assert!(stop.is_triggered());
    }
}
