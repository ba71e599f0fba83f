//! Proactive nudge candidate selection.
//!
//! Finds conversations where the user has gone quiet for longer than the
//! configured period and pairs each with its fixed localised check-in
//! template. Selection is deterministic; actually generating and sending a
//! nudge is the caller's concern.

use crate::config::CoreConfig;
use crate::constants::{NUDGE_TEMPLATE_EN, NUDGE_TEMPLATE_HE};
use crate::repositories::conversations::ConversationService;
use crate::repositories::shared::scan_conversation_ids;
use crate::ChatResult;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use solace_types::Language;
use std::sync::Arc;

/// A conversation due for a check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NudgeCandidate {
    pub conversation_id: String,
    pub owner: String,
    pub language: Language,
    /// Fixed localised template for the check-in message.
    pub template: String,
}

/// The fixed check-in template for a language.
pub fn nudge_template(language: Language) -> &'static str {
    match language {
        Language::En => NUDGE_TEMPLATE_EN,
        Language::He => NUDGE_TEMPLATE_HE,
    }
}

/// Service selecting quiet conversations for a check-in.
#[derive(Clone, Debug)]
pub struct NudgeService {
    cfg: Arc<CoreConfig>,
}

impl NudgeService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Conversations with no user activity since `now - nudge_quiet_hours`.
    ///
    /// A conversation with no user turn at all is measured from its creation
    /// time. Unreadable conversations are logged and skipped.
    pub fn candidates(&self, now: DateTime<Utc>) -> ChatResult<Vec<NudgeCandidate>> {
        let cutoff = now - Duration::hours(self.cfg.nudge_quiet_hours());
        let mut candidates = Vec::new();

        for id in scan_conversation_ids(&self.cfg.conversations_dir()) {
            let service = ConversationService::with_id(self.cfg.clone(), id.clone());
            let conversation = match service.read() {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(conversation_id = %id, error = %e, "skipping unreadable conversation");
                    continue;
                }
            };

            let last_user = conversation
                .last_user_activity()
                .unwrap_or(conversation.meta.created_at);

            if last_user < cutoff {
                candidates.push(NudgeCandidate {
                    conversation_id: conversation.meta.conversation_id.clone(),
                    owner: conversation.meta.owner.clone(),
                    language: conversation.meta.language,
                    template: nudge_template(conversation.meta.language).to_owned(),
                });
            }
        }

        Ok(candidates)
    }
}
