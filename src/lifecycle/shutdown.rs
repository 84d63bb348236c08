//! Shutdown coordination for the aggregator.
//!
//! `main` subscribes the server before the signal listener starts, so a
//! SIGTERM that lands during startup still stops `ResultServer::run`.

use tokio::sync::broadcast;

/// Fan-out handle that tells the result server to stop accepting
/// connections and start draining.
///
/// Clones share one channel: the signal listener holds one to trigger,
/// tests hold another to stop an aggregator they started.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Start draining every subscribed server. Subscribers created later
    /// will not see it.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
