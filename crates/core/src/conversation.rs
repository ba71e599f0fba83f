//! Conversation data model.

use crate::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solace_types::Language;

/// Conversation metadata, stored as `conversation.yaml` alongside the message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMeta {
    /// Canonical 32-hex conversation identifier.
    pub conversation_id: String,
    /// Owning user identity (email).
    pub owner: String,
    /// Display language; selects fallback and nudge sentences.
    #[serde(default)]
    pub language: Language,
    pub created_at: DateTime<Utc>,
}

/// A full conversation: metadata plus the ordered message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub meta: ConversationMeta,
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Timestamp of the most recent activity, falling back to creation time
    /// for an empty conversation.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.messages
            .iter()
            .map(|m| m.created_at)
            .max()
            .unwrap_or(self.meta.created_at)
    }

    /// Timestamp of the most recent *user* turn, if any.
    pub fn last_user_activity(&self) -> Option<DateTime<Utc>> {
        self.messages
            .iter()
            .filter(|m| !m.is_assistant())
            .map(|m| m.created_at)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 22, h, 0, 0).unwrap()
    }

    fn conversation(messages: Vec<Message>) -> Conversation {
        Conversation {
            meta: ConversationMeta {
                conversation_id: "550e8400e29b41d4a716446655440000".into(),
                owner: "alex@example.org".into(),
                language: Language::En,
                created_at: at(8),
            },
            messages,
        }
    }

    #[test]
    fn test_last_activity_of_empty_conversation_is_creation() {
        let conv = conversation(vec![]);
        assert_eq!(conv.last_activity(), at(8));
    }

    #[test]
    fn test_last_activity_tracks_latest_message() {
        let conv = conversation(vec![
            Message::text(Role::User, "hi", at(9)),
            Message::text(Role::Assistant, "hello", at(10)),
        ]);
        assert_eq!(conv.last_activity(), at(10));
    }

    #[test]
    fn test_last_user_activity_ignores_assistant_turns() {
        let conv = conversation(vec![
            Message::text(Role::User, "hi", at(9)),
            Message::text(Role::Assistant, "hello", at(11)),
        ]);
        assert_eq!(conv.last_user_activity(), Some(at(9)));

        let assistant_only = conversation(vec![Message::text(Role::Assistant, "hello", at(11))]);
        assert_eq!(assistant_only.last_user_activity(), None);
    }
}
