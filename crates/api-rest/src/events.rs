//! Live-update fan-out.
//!
//! Every successful message append is published here and fanned out to the
//! SSE subscribers of the affected conversation. A single broadcast channel
//! carries all conversations; subscribers filter by id. Slow subscribers that
//! lag past the channel capacity are dropped by the channel, which ends their
//! stream - the client recovers with a canonical refetch.

use api_shared::MessageDto;
use serde::Serialize;
use tokio::sync::broadcast;

/// Default capacity of the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// One live update: new messages for a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationEvent {
    pub conversation_id: String,
    pub messages: Vec<MessageDto>,
}

/// Broadcast bus for conversation events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ConversationEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { tx }
    }

    /// Publishes an event; having no subscribers is not an error.
    pub fn publish(&self, event: ConversationEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!(error = %e, "no live subscribers for event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
