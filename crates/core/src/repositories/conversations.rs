//! Conversation repository.
//!
//! Manages the on-disk life of a conversation: a sharded directory holding
//! `conversation.yaml` (owner, language, timestamps) and `messages.json` (the
//! ordered message log).
//!
//! ## Architecture
//!
//! - **Type-state pattern** for compile-time safety (Uninitialised/Initialised)
//! - **UUID-based sharded storage** for scalability
//! - **Whole-log rewrite on append** - logs are small (one user's chat) and a
//!   single-file rewrite keeps reads trivially consistent

use crate::config::CoreConfig;
use crate::constants::{CONVERSATION_YAML_FILENAME, MESSAGES_JSON_FILENAME};
use crate::conversation::{Conversation, ConversationMeta};
use crate::error::{ChatError, ChatResult};
use crate::message::Message;
use crate::repositories::shared::{create_uuid_and_shard_dir, scan_conversation_ids};
use crate::validation::validate_owner_identity;
use chrono::Utc;
use solace_types::Language;
use solace_uuid::{TimestampUuid, UuidService};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

// ============================================================================
// TYPE-STATE MARKERS
// ============================================================================

/// Marker type: conversation does not yet exist.
///
/// Only `initialise()` can be called in this state.
#[derive(Clone, Copy, Debug)]
pub struct Uninitialised;

/// Marker type: conversation exists.
///
/// Indicates a valid conversation directory with a known UUID.
#[derive(Clone, Debug)]
pub struct Initialised {
    conversation_id: UuidService,
}

// ============================================================================
// CONVERSATION SERVICE
// ============================================================================

/// Service for managing conversation storage operations.
///
/// Uses type-state pattern to enforce correct usage at compile time.
/// Generic parameter `S` is either `Uninitialised` or `Initialised`.
#[derive(Clone, Debug)]
pub struct ConversationService<S> {
    cfg: Arc<CoreConfig>,
    state: S,
}

impl ConversationService<Uninitialised> {
    /// Creates new conversation service in uninitialised state.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            cfg,
            state: Uninitialised,
        }
    }

    /// Initialises a new conversation for an owner.
    ///
    /// Creates:
    /// - UUID and sharded directory structure
    /// - conversations/{shard1}/{shard2}/{uuid}/ directory
    /// - conversation.yaml with owner and language
    /// - an empty messages.json log
    ///
    /// Consumes self and returns `ConversationService<Initialised>`.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::InvalidInput` for a malformed owner identity, or a
    /// storage error if directory or file creation fails.
    pub fn initialise(
        self,
        owner: String,
        language: Language,
    ) -> ChatResult<ConversationService<Initialised>> {
        validate_owner_identity(&owner)?;

        let conversations_dir = self.cfg.conversations_dir();
        let (conversation_id, conversation_dir) =
            create_uuid_and_shard_dir(&conversations_dir, UuidService::new)?;

        let meta = ConversationMeta {
            conversation_id: conversation_id.to_string(),
            owner,
            language,
            created_at: Utc::now(),
        };

        let meta_yaml = serde_yaml::to_string(&meta).map_err(ChatError::YamlSerialization)?;
        fs::write(
            conversation_dir.join(CONVERSATION_YAML_FILENAME),
            meta_yaml,
        )
        .map_err(ChatError::FileWrite)?;
        fs::write(conversation_dir.join(MESSAGES_JSON_FILENAME), "[]")
            .map_err(ChatError::FileWrite)?;

        tracing::info!(conversation_id = %conversation_id, "initialised conversation");

        Ok(ConversationService {
            cfg: self.cfg,
            state: Initialised { conversation_id },
        })
    }
}

impl ConversationService<Initialised> {
    /// Creates conversation service for an existing conversation.
    pub fn with_id(cfg: Arc<CoreConfig>, conversation_id: UuidService) -> Self {
        Self {
            cfg,
            state: Initialised { conversation_id },
        }
    }

    /// Parses an externally supplied id and checks the conversation exists.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Uuid` for a non-canonical id and
    /// `ChatError::ConversationNotFound` when no directory exists for it.
    pub fn open(cfg: Arc<CoreConfig>, conversation_id: &str) -> ChatResult<Self> {
        let uuid = UuidService::parse(conversation_id)?;
        let service = Self::with_id(cfg, uuid);
        if !service.exists() {
            return Err(ChatError::ConversationNotFound(
                conversation_id.to_owned(),
            ));
        }
        Ok(service)
    }

    pub fn conversation_id(&self) -> &UuidService {
        &self.state.conversation_id
    }

    fn dir(&self) -> PathBuf {
        self.state
            .conversation_id
            .sharded_dir(&self.cfg.conversations_dir())
    }

    pub fn exists(&self) -> bool {
        self.dir().join(CONVERSATION_YAML_FILENAME).is_file()
    }

    /// Reads the full conversation: metadata plus ordered message log.
    pub fn read(&self) -> ChatResult<Conversation> {
        let dir = self.dir();

        let meta_raw = fs::read_to_string(dir.join(CONVERSATION_YAML_FILENAME))
            .map_err(ChatError::FileRead)?;
        let meta: ConversationMeta =
            serde_yaml::from_str(&meta_raw).map_err(ChatError::YamlDeserialization)?;

        let messages_raw =
            fs::read_to_string(dir.join(MESSAGES_JSON_FILENAME)).map_err(ChatError::FileRead)?;
        let messages: Vec<Message> =
            serde_json::from_str(&messages_raw).map_err(ChatError::Deserialization)?;

        Ok(Conversation { meta, messages })
    }

    /// Appends a message to the log, assigning a store id when it has none.
    ///
    /// Store ids are time-prefixed and monotonic against the previous
    /// message's id, so the log stays strictly ordered even when two appends
    /// land on the same clock millisecond.
    ///
    /// Returns the message as persisted (with its id filled in).
    pub fn append_message(&self, mut message: Message) -> ChatResult<Message> {
        let mut conversation = self.read()?;

        if message.id.is_none() {
            let last_id = conversation
                .messages
                .iter()
                .rev()
                .find_map(|m| m.id.as_deref());
            let id = TimestampUuid::generate_from_str(last_id)
                .unwrap_or_else(|_| TimestampUuid::generate(None));
            message.id = Some(id.to_string());
        }

        conversation.messages.push(message.clone());
        self.write_messages(&conversation.messages)?;

        Ok(message)
    }

    /// Replaces the whole message log.
    ///
    /// Used by the backfill pass after rewriting stored content.
    pub fn overwrite_messages(&self, messages: &[Message]) -> ChatResult<()> {
        self.write_messages(messages)
    }

    /// Deletes the conversation directory and everything in it.
    pub fn delete(self) -> ChatResult<()> {
        let dir = self.dir();
        fs::remove_dir_all(&dir).map_err(ChatError::ConversationRemoval)?;
        tracing::info!(conversation_id = %self.state.conversation_id, "deleted conversation");
        Ok(())
    }

    fn write_messages(&self, messages: &[Message]) -> ChatResult<()> {
        let json = serde_json::to_string_pretty(messages).map_err(ChatError::Serialization)?;
        fs::write(self.dir().join(MESSAGES_JSON_FILENAME), json).map_err(ChatError::FileWrite)
    }
}

/// Lists metadata for every stored conversation.
///
/// Unreadable or unparsable conversations are logged as warnings and skipped,
/// matching the maintenance services' tolerance for partial damage.
pub fn list_conversations(cfg: &Arc<CoreConfig>) -> Vec<ConversationMeta> {
    let mut result = Vec::new();

    for id in scan_conversation_ids(&cfg.conversations_dir()) {
        let service = ConversationService::with_id(cfg.clone(), id.clone());
        match service.read() {
            Ok(conversation) => result.push(conversation.meta),
            Err(e) => {
                tracing::warn!(conversation_id = %id, error = %e, "failed to read conversation");
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::policy::FallbackPolicy;

    fn test_cfg(dir: &std::path::Path) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(
                dir.to_path_buf(),
                30,
                48,
                FallbackPolicy::FailOpen,
                None,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_initialise_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_cfg(dir.path());

        let service = ConversationService::new(cfg.clone())
            .initialise("alex@example.org".into(), Language::En)
            .unwrap();

        assert!(service.exists());
        let conversation = service.read().unwrap();
        assert_eq!(conversation.meta.owner, "alex@example.org");
        assert_eq!(conversation.meta.language, Language::En);
        assert!(conversation.messages.is_empty());
    }

    #[test]
    fn test_initialise_rejects_bad_owner() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_cfg(dir.path());

        let result = ConversationService::new(cfg).initialise("not-an-email".into(), Language::En);
        assert!(result.is_err());
    }

    #[test]
    fn test_append_assigns_monotonic_ids() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_cfg(dir.path());
        let service = ConversationService::new(cfg)
            .initialise("alex@example.org".into(), Language::En)
            .unwrap();

        let first = service
            .append_message(Message::text(Role::User, "hi", Utc::now()))
            .unwrap();
        let second = service
            .append_message(Message::text(Role::Assistant, "hello", Utc::now()))
            .unwrap();

        let id1: TimestampUuid = first.id.as_deref().unwrap().parse().unwrap();
        let id2: TimestampUuid = second.id.as_deref().unwrap().parse().unwrap();
        assert!(id2.timestamp() > id1.timestamp());

        let conversation = service.read().unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].id, first.id);
    }

    #[test]
    fn test_append_preserves_supplied_id() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_cfg(dir.path());
        let service = ConversationService::new(cfg)
            .initialise("alex@example.org".into(), Language::En)
            .unwrap();

        let mut message = Message::text(Role::User, "hi", Utc::now());
        message.id = Some("external-id-1".into());
        let stored = service.append_message(message).unwrap();
        assert_eq!(stored.id.as_deref(), Some("external-id-1"));
    }

    #[test]
    fn test_open_rejects_unknown_and_malformed_ids() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_cfg(dir.path());

        assert!(matches!(
            ConversationService::open(cfg.clone(), "not-canonical"),
            Err(ChatError::Uuid(_))
        ));
        assert!(matches!(
            ConversationService::open(cfg, "550e8400e29b41d4a716446655440000"),
            Err(ChatError::ConversationNotFound(_))
        ));
    }

    #[test]
    fn test_delete_removes_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_cfg(dir.path());
        let service = ConversationService::new(cfg.clone())
            .initialise("alex@example.org".into(), Language::En)
            .unwrap();
        let id = service.conversation_id().to_string();

        service.clone().delete().unwrap();
        assert!(matches!(
            ConversationService::open(cfg, &id),
            Err(ChatError::ConversationNotFound(_))
        ));
    }

    #[test]
    fn test_list_conversations_sees_all() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_cfg(dir.path());

        for owner in ["a@example.org", "b@example.org"] {
            ConversationService::new(cfg.clone())
                .initialise(owner.into(), Language::En)
                .unwrap();
        }

        let metas = list_conversations(&cfg);
        assert_eq!(metas.len(), 2);
    }
}
