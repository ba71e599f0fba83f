//! Backfill sanitisation over stored conversations.
//!
//! Re-applies the current filter to assistant messages that were persisted
//! before the pattern set reached its present form. Only altered messages are
//! rewritten; a turn suppressed under the fail-closed policy is removed from
//! the log.

use crate::config::CoreConfig;
use crate::repositories::conversations::ConversationService;
use crate::repositories::shared::scan_conversation_ids;
use crate::sanitiser::{MessageDisposition, Sanitiser};
use crate::ChatResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of one backfill pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillOutcome {
    /// Conversations inspected.
    pub conversations: usize,
    /// Messages rewritten in place.
    pub rewritten: usize,
    /// Messages removed under the fail-closed policy.
    pub suppressed: usize,
}

/// Service re-sanitising the stored message logs.
#[derive(Clone, Debug)]
pub struct BackfillService {
    cfg: Arc<CoreConfig>,
    sanitiser: Sanitiser,
}

impl BackfillService {
    pub fn new(cfg: Arc<CoreConfig>, sanitiser: Sanitiser) -> Self {
        Self { cfg, sanitiser }
    }

    /// Walks the store, rewriting any assistant message the filter alters.
    ///
    /// Clean conversations are not rewritten at all. Unreadable conversations
    /// are logged and skipped.
    pub fn run(&self) -> ChatResult<BackfillOutcome> {
        let mut outcome = BackfillOutcome {
            conversations: 0,
            rewritten: 0,
            suppressed: 0,
        };

        for id in scan_conversation_ids(&self.cfg.conversations_dir()) {
            let service = ConversationService::with_id(self.cfg.clone(), id.clone());
            let mut conversation = match service.read() {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(conversation_id = %id, error = %e, "skipping unreadable conversation");
                    continue;
                }
            };

            outcome.conversations += 1;
            let language = conversation.meta.language;
            let mut changed = false;

            conversation.messages.retain_mut(|message| {
                match self.sanitiser.sanitise_message(message, language) {
                    MessageDisposition::Unchanged => true,
                    MessageDisposition::Rewritten => {
                        outcome.rewritten += 1;
                        changed = true;
                        true
                    }
                    MessageDisposition::Suppressed => {
                        outcome.suppressed += 1;
                        changed = true;
                        false
                    }
                }
            });

            if changed {
                service.overwrite_messages(&conversation.messages)?;
            }
        }

        tracing::info!(
            conversations = outcome.conversations,
            rewritten = outcome.rewritten,
            suppressed = outcome.suppressed,
            "backfill sanitisation complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SERVER_MIN_CLEAN_CHARS;
    use crate::message::{Message, Role};
    use crate::patterns::PatternSet;
    use crate::policy::FallbackPolicy;
    use chrono::Utc;
    use solace_types::Language;

    fn test_cfg(dir: &std::path::Path) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(dir.to_path_buf(), 30, 48, FallbackPolicy::FailOpen, None).unwrap(),
        )
    }

    #[test]
    fn test_backfill_rewrites_only_altered_messages() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_cfg(dir.path());
        let now = Utc::now();

        let conv = ConversationService::new(cfg.clone())
            .initialise("alex@example.org".into(), Language::En)
            .unwrap();
        conv.append_message(Message::text(Role::User, "hi", now)).unwrap();
        conv.append_message(Message::text(Role::Assistant, "A clean reply for you.", now))
            .unwrap();
        conv.append_message(Message::text(
            Role::Assistant,
            "THOUGHT: plan\nHow are you feeling today?",
            now,
        ))
        .unwrap();

        let outcome = BackfillService::new(cfg, Sanitiser::with_defaults())
            .run()
            .unwrap();
        assert_eq!(outcome.conversations, 1);
        assert_eq!(outcome.rewritten, 1);
        assert_eq!(outcome.suppressed, 0);

        let stored = conv.read().unwrap();
        assert_eq!(stored.messages.len(), 3);
        assert_eq!(
            stored.messages[1].content_str(),
            Some("A clean reply for you.")
        );
        assert_eq!(
            stored.messages[2].content_str(),
            Some("How are you feeling today?")
        );
    }

    #[test]
    fn test_backfill_removes_suppressed_turns_under_fail_closed() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_cfg(dir.path());
        let now = Utc::now();

        let conv = ConversationService::new(cfg.clone())
            .initialise("alex@example.org".into(), Language::En)
            .unwrap();
        conv.append_message(Message::text(Role::Assistant, "THOUGHT: only leakage", now))
            .unwrap();

        let strict = Sanitiser::new(
            PatternSet::default_set(),
            FallbackPolicy::FailClosed,
            SERVER_MIN_CLEAN_CHARS,
        );
        let outcome = BackfillService::new(cfg, strict).run().unwrap();
        assert_eq!(outcome.suppressed, 1);

        let stored = conv.read().unwrap();
        assert!(stored.messages.is_empty());
    }
}
