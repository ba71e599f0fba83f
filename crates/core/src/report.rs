//! Compliance report aggregation.
//!
//! Produces counts over the whole store: conversations, messages per role,
//! stored content that still carries leakage patterns, and stored content
//! that is not a plain string. Computed fresh on every request - nothing is
//! cached or persisted.

use crate::config::CoreConfig;
use crate::message::Role;
use crate::repositories::conversations::ConversationService;
use crate::repositories::shared::scan_conversation_ids;
use crate::sanitiser::Sanitiser;
use crate::ChatResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Aggregate counts over the conversation store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub generated_at: DateTime<Utc>,
    pub conversations: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    /// Stored string content still matching a forbidden pattern.
    pub leakage_messages: usize,
    /// Stored content that is not a plain string.
    pub non_string_contents: usize,
    /// Conversations that could not be read and were skipped.
    pub unreadable_conversations: usize,
}

/// Service producing compliance reports.
#[derive(Clone, Debug)]
pub struct ComplianceService {
    cfg: Arc<CoreConfig>,
    sanitiser: Sanitiser,
}

impl ComplianceService {
    pub fn new(cfg: Arc<CoreConfig>, sanitiser: Sanitiser) -> Self {
        Self { cfg, sanitiser }
    }

    /// Walks the store and aggregates the report.
    ///
    /// Unreadable conversations are counted and skipped rather than failing
    /// the whole report.
    pub fn generate(&self, now: DateTime<Utc>) -> ChatResult<ComplianceReport> {
        let mut report = ComplianceReport {
            generated_at: now,
            conversations: 0,
            user_messages: 0,
            assistant_messages: 0,
            leakage_messages: 0,
            non_string_contents: 0,
            unreadable_conversations: 0,
        };

        for id in scan_conversation_ids(&self.cfg.conversations_dir()) {
            let service = ConversationService::with_id(self.cfg.clone(), id.clone());
            let conversation = match service.read() {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(conversation_id = %id, error = %e, "unreadable conversation in report");
                    report.unreadable_conversations += 1;
                    continue;
                }
            };

            report.conversations += 1;

            for message in &conversation.messages {
                match message.role {
                    Role::User => report.user_messages += 1,
                    Role::Assistant => report.assistant_messages += 1,
                }

                match message.content_str() {
                    Some(text) => {
                        if self.sanitiser.has_leakage(text) {
                            report.leakage_messages += 1;
                        }
                    }
                    None => report.non_string_contents += 1,
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::policy::FallbackPolicy;
    use serde_json::json;
    use solace_types::Language;

    fn test_cfg(dir: &std::path::Path) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(dir.to_path_buf(), 30, 48, FallbackPolicy::FailOpen, None).unwrap(),
        )
    }

    #[test]
    fn test_report_counts_fixture_store() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_cfg(dir.path());
        let now = Utc::now();

        let conv = ConversationService::new(cfg.clone())
            .initialise("alex@example.org".into(), Language::En)
            .unwrap();
        conv.append_message(Message::text(Role::User, "hi", now)).unwrap();
        conv.append_message(Message::text(
            Role::Assistant,
            "THOUGHT: leaked line\nHow are you feeling?",
            now,
        ))
        .unwrap();
        conv.append_message(Message {
            id: None,
            role: Role::Assistant,
            content: json!({"assistant_message": "structured"}),
            metadata: None,
            created_at: now,
        })
        .unwrap();

        let report = ComplianceService::new(cfg, Sanitiser::with_defaults())
            .generate(now)
            .unwrap();

        assert_eq!(report.conversations, 1);
        assert_eq!(report.user_messages, 1);
        assert_eq!(report.assistant_messages, 2);
        assert_eq!(report.leakage_messages, 1);
        assert_eq!(report.non_string_contents, 1);
        assert_eq!(report.unreadable_conversations, 0);
    }

    #[test]
    fn test_report_on_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_cfg(dir.path());
        let report = ComplianceService::new(cfg, Sanitiser::with_defaults())
            .generate(Utc::now())
            .unwrap();
        assert_eq!(report.conversations, 0);
        assert_eq!(report.user_messages + report.assistant_messages, 0);
    }
}
