//! Constants used throughout the Solace core crate.
//!
//! This module contains all path, filename, and threshold constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Directory name for conversation storage.
pub const CONVERSATIONS_DIR_NAME: &str = "conversations";

/// Default directory for chat data storage when no explicit directory is configured.
pub const DEFAULT_CHAT_DATA_DIR: &str = "chat_data";

/// Filename for the ordered message log of a conversation.
pub const MESSAGES_JSON_FILENAME: &str = "messages.json";

/// Filename for conversation metadata (owner, language, timestamps).
pub const CONVERSATION_YAML_FILENAME: &str = "conversation.yaml";

/// Minimum cleaned length enforced server-side before persisting an assistant message.
/// Anything shorter after filtering is treated as effectively empty.
pub const SERVER_MIN_CLEAN_CHARS: usize = 10;

/// Minimum cleaned length enforced client-side immediately before render.
pub const CLIENT_MIN_CLEAN_CHARS: usize = 5;

/// Fixed English sentence substituted when filtering leaves nothing displayable.
pub const FALLBACK_SENTENCE_EN: &str = "I'm here with you. How are you feeling right now?";

/// Fixed Hebrew sentence substituted when filtering leaves nothing displayable.
pub const FALLBACK_SENTENCE_HE: &str = "אני כאן איתך. איך אתה מרגיש עכשיו?";

/// Generic English acknowledgment used when a structured payload carries no
/// recognisable display field.
pub const GENERIC_ACK_EN: &str = "I'm here and listening.";

/// Generic Hebrew acknowledgment used when a structured payload carries no
/// recognisable display field.
pub const GENERIC_ACK_HE: &str = "אני כאן ומקשיב.";

/// Field name the upstream agent uses to carry the user-facing string inside a
/// JSON envelope.
pub const ASSISTANT_MESSAGE_FIELD: &str = "assistant_message";

/// Default conversation retention window in days.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Default quiet period in hours before a conversation becomes a nudge candidate.
pub const DEFAULT_NUDGE_QUIET_HOURS: i64 = 48;

/// Fixed English nudge template for quiet conversations.
pub const NUDGE_TEMPLATE_EN: &str =
    "Just checking in. No pressure to reply - I'm here whenever you want to talk.";

/// Fixed Hebrew nudge template for quiet conversations.
pub const NUDGE_TEMPLATE_HE: &str = "רק רציתי לבדוק מה שלומך. אני כאן מתי שתרצה לדבר.";
