//! Shutdown broadcast for the proxy listener.
//!
//! Triggering stops `HttpServer::run` from accepting connections; responses
//! already streaming from the upstream are allowed to finish first.

use tokio::sync::broadcast;

/// One-shot stop signal shared by the signal watcher and the server.
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

    /// Fire the signal. Safe to call with no subscribers left.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
