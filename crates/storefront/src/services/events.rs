//! In-process cart event channel.
//!
//! A broadcast channel owned by `AppState`: subscribing returns a
//! receiver, and dropping the receiver is the teardown. Cart mutation
//! handlers publish the new item count after every change.

use tokio::sync::broadcast;

/// Default channel capacity; slow subscribers lag rather than block.
const CHANNEL_CAPACITY: usize = 64;

/// Broadcast channel for cart item-count changes.
#[derive(Debug, Clone)]
pub struct CartEvents {
    tx: broadcast::Sender<u32>,
}

impl CartEvents {
    /// Create a new event channel.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to cart count changes.
    ///
    /// Dropping the receiver unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<u32> {
        self.tx.subscribe()
    }

    /// Publish a new cart item count to all subscribers.
    ///
    /// A send with no subscribers is not an error.
    pub fn publish(&self, count: u32) {
        let _ = self.tx.send(count);
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}
