//! Wire DTOs for the Solace REST API.
//!
//! Plain serde structs with OpenAPI schemas. Timestamps travel as RFC 3339
//! strings; roles and language tags travel as strings and are validated at
//! the handler boundary. Message content is a raw JSON value because the
//! upstream platform can (and does) deliver structured objects where a
//! display string belongs - the safety pipeline, not the wire layer, decides
//! what becomes visible.

use serde::{Deserialize, Serialize};
use solace_core::{ComplianceReport, Message, Role};
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// One chat message on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// "user" or "assistant".
    pub role: String,
    /// Display string in the happy path; may be a structured object.
    #[schema(value_type = Object)]
    pub content: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub metadata: Option<serde_json::Value>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            role: message.role.to_string(),
            content: message.content,
            metadata: message.metadata,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Conversation metadata on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationMetaDto {
    pub conversation_id: String,
    pub owner: String,
    /// Two-letter display language tag.
    pub language: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

/// Full conversation: metadata plus the ordered message log.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationRes {
    #[serde(flatten)]
    pub meta: ConversationMetaDto,
    pub messages: Vec<MessageDto>,
}

/// Request to create a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateConversationReq {
    /// Owning user identity (email).
    pub owner: String,
    /// Two-letter display language tag; defaults to "en".
    #[serde(default)]
    pub language: Option<String>,
}

/// Response to conversation creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateConversationRes {
    pub conversation_id: String,
}

/// Conversation listing response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListConversationsRes {
    pub conversations: Vec<ConversationMetaDto>,
}

/// Request to append a message to a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostMessageReq {
    /// "user" or "assistant".
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Response to a message append.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostMessageRes {
    pub message: MessageDto,
    /// True when the safety pipeline altered or substituted the stored text.
    pub altered: bool,
}

/// Compliance report on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComplianceReportRes {
    /// RFC 3339 timestamp.
    pub generated_at: String,
    pub conversations: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub leakage_messages: usize,
    pub non_string_contents: usize,
    pub unreadable_conversations: usize,
}

impl From<ComplianceReport> for ComplianceReportRes {
    fn from(report: ComplianceReport) -> Self {
        Self {
            generated_at: report.generated_at.to_rfc3339(),
            conversations: report.conversations,
            user_messages: report.user_messages,
            assistant_messages: report.assistant_messages,
            leakage_messages: report.leakage_messages,
            non_string_contents: report.non_string_contents,
            unreadable_conversations: report.unreadable_conversations,
        }
    }
}

/// Retention sweep response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RetentionSweepRes {
    pub examined: usize,
    pub removed: usize,
}

/// Backfill sanitisation response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BackfillRes {
    pub conversations: usize,
    pub rewritten: usize,
    pub suppressed: usize,
}

/// One nudge candidate on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NudgeCandidateDto {
    pub conversation_id: String,
    pub owner: String,
    pub language: String,
    pub template: String,
}

/// Nudge candidate listing response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NudgeCandidatesRes {
    pub candidates: Vec<NudgeCandidateDto>,
}

/// Parses a wire role string.
pub fn parse_role(role: &str) -> Option<Role> {
    match role.trim() {
        "user" => Some(Role::User),
        "assistant" => Some(Role::Assistant),
        _ => None,
    }
}
