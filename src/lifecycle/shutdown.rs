//! Graceful stop of the listeners.
//!
//! The plain listener and the optional HTTPS listener each hold a receiver;
//! one trigger stops both. Resolutions already in flight finish before the
//! server returns.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::lifecycle::signals;

/// Fans a single stop request out to every listener.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver handed to a listener; resolves once [`Shutdown::trigger`] runs.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed listener to stop accepting connections.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Listeners still waiting for the stop request.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Trigger once SIGINT or SIGTERM arrives.
    pub fn trigger_on_signal(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            signals::wait_for_shutdown_signal().await;
            self.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.clone().subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[test]
    fn test_trigger_without_subscribers_is_harmless() {
        let shutdown = Shutdown::default();
        shutdown.trigger();
        assert_eq!(shutdown.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_signal_task_keeps_receivers_pending() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let task = shutdown.trigger_on_signal();

        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
        task.abort();
    }
}
