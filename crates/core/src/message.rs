//! Chat message data model.
//!
//! A message's `content` is *supposed* to be a display string, but the upstream
//! agent integration may violate this and deliver a structured JSON object in
//! its place. The field is therefore typed as [`serde_json::Value`] and every
//! display path goes through the envelope extraction in [`crate::envelope`]
//! before anything reaches a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single chat turn as stored and as delivered over the live channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned identifier; absent on turns that have not been persisted yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: Role,
    /// Display string in the happy path; may arrive as a structured object.
    pub content: Value,
    /// Arbitrary side-channel data (for example, extracted structured fields).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Builds a plain-string message with no id or metadata.
    pub fn text(role: Role, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            role,
            content: Value::String(content.into()),
            metadata: None,
            created_at,
        }
    }

    /// Returns the content as a string slice when it really is a string.
    pub fn content_str(&self) -> Option<&str> {
        self.content.as_str()
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
