//! Broadcast channel for state-change notifications.
//!
//! Stores publish an event after every state transition; a rendering layer
//! subscribes and redraws from the store's accessors. Nothing in the core
//! assumes a reactive framework.

use tokio::sync::broadcast;

/// Default ring-buffer size for a bus.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Broadcast bus for events of type `T`.
///
/// When the ring buffer is full the oldest events are dropped for lagging
/// receivers.
#[derive(Debug, Clone)]
pub struct EventBus<T: Clone> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> EventBus<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that got the event; with no receivers
    /// the event is dropped.
    pub fn publish(&self, event: T) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a receiver for all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus: EventBus<u32> = EventBus::default();
        assert_eq!(bus.publish(7), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_in_publish_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish("first");
        bus.publish("second");

        assert_eq!(rx.recv().await.unwrap(), "first");
        assert_eq!(rx.recv().await.unwrap(), "second");
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus: EventBus<()> = EventBus::new(4);
        assert_eq!(bus.receiver_count(), 0);

        let rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);

        drop(rx);
        assert_eq!(bus.receiver_count(), 0);
    }
}
