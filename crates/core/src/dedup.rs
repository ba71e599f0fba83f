//! Deterministic render-key derivation for message deduplication.
//!
//! The live channel can deliver the same logical turn several times - partial
//! streaming updates, replays after reconnect. The rendered list must hold at
//! most one bubble per logical turn, so every message is assigned a
//! [`RenderKey`] and a later delivery with the same key replaces the earlier
//! rendering in place.
//!
//! Identity is never derived from content. Two messages with identical text
//! in different positions are distinct turns; two deliveries of the same id
//! are one turn regardless of how their text differs.

use crate::message::{Message, Role};
use chrono::{DateTime, Utc};

/// Identity of a rendered chat bubble.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderKey {
    /// Store-assigned message id - the strongest identity.
    Id(String),
    /// Positional identity for turns without an id.
    Composite {
        role: Role,
        created_at: DateTime<Utc>,
        index: usize,
    },
    /// Synthetic key for one in-flight assistant response cycle, reused by
    /// every partial update of that cycle.
    Cycle(u64),
}

impl RenderKey {
    /// Derives the key for a delivered message.
    ///
    /// Priority: the store-assigned id when present; else, for an assistant
    /// turn while a response cycle is active, the cycle's synthetic key (a
    /// partial update carries a fresh `created_at` on every delivery, so the
    /// positional key would split one turn into many bubbles); else the
    /// positional composite of role, timestamp, and index within the batch.
    pub fn derive(message: &Message, index: usize, active_cycle: Option<u64>) -> RenderKey {
        if let Some(id) = &message.id {
            return RenderKey::Id(id.clone());
        }

        if message.is_assistant() {
            if let Some(cycle) = active_cycle {
                return RenderKey::Cycle(cycle);
            }
        }

        RenderKey::Composite {
            role: message.role,
            created_at: message.created_at,
            index,
        }
    }
}
