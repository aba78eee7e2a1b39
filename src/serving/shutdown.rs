//! Shutdown coordination for the server runner.

use tokio::sync::broadcast;

/// Hand-off point between whatever decides to stop (an OS signal, a test)
/// and the runner waiting for that decision.
///
/// Cloning shares the same underlying channel, so any clone can trigger.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe before triggering; a trigger with no subscribers is lost.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Request shutdown. Safe to call more than once.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
