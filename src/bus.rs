use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because messages hop across tasks.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes `msg` to every current subscriber and returns how many
    /// received it. Publishing with no subscribers is not an error.
    pub fn publish(&self, msg: T) -> usize {
        match self.tx.send(Arc::new(msg)) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("Published with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}
