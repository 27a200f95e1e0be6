//! Broadcast channel for feed events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The connection
//! loop publishes a [`FeedEvent`] after every feed or state mutation, and
//! renderers subscribe to follow along.

use tokio::sync::broadcast;

use super::FeedEvent;

/// Broadcast bus for [`FeedEvent`]s.
///
/// When the ring buffer is full the oldest events are dropped for lagging
/// receivers; they can recover by asking the client for a full snapshot.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FeedEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that got the event. With no
    /// receivers the event is dropped.
    pub fn publish(&self, event: FeedEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a receiver for all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.sender.subscribe()
    }
}
