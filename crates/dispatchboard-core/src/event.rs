//! Event bus for dispatchboard using tokio::broadcast
//!
//! Lets chart components learn that the shared filter state changed without
//! polling the store.

use tokio::sync::broadcast;

use crate::filter::Filter;

/// Events emitted by the filter store
#[derive(Debug, Clone)]
pub enum FilterEvent {
    /// A filter was appended
    Added(Filter),
    /// A date-range filter superseded the previous one
    Replaced { previous: Filter, current: Filter },
    /// A filter was removed by id
    Removed(Filter),
    /// All filters were cleared
    Cleared { count: usize },
    /// Legacy legend visibility flag flipped
    LegendToggled {
        chart_id: String,
        item_key: String,
        hidden: bool,
    },
}

/// Event bus for broadcasting filter events
///
/// Uses tokio::broadcast for multi-consumer support.
pub struct EventBus {
    sender: broadcast::Sender<FilterEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (256 events)
    pub fn default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: FilterEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<FilterEvent> {
        self.sender.subscribe()
    }

    /// Get current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
