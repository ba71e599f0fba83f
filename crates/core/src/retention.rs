//! Conversation retention sweep.
//!
//! Deletes conversations whose latest activity is older than the configured
//! retention window. Run periodically by an operator (CLI) or the admin API;
//! a damaged conversation is skipped with a warning rather than aborting the
//! sweep.

use crate::config::CoreConfig;
use crate::repositories::conversations::ConversationService;
use crate::repositories::shared::scan_conversation_ids;
use crate::ChatResult;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Result of one retention sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionOutcome {
    /// Conversations inspected.
    pub examined: usize,
    /// Conversations deleted.
    pub removed: usize,
}

/// Service deleting conversations past the retention window.
#[derive(Clone, Debug)]
pub struct RetentionService {
    cfg: Arc<CoreConfig>,
}

impl RetentionService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Sweeps the store, deleting conversations whose last activity is older
    /// than `now - retention_days`.
    ///
    /// # Errors
    ///
    /// Propagates deletion failures; read failures on individual
    /// conversations are logged and skipped.
    pub fn sweep(&self, now: DateTime<Utc>) -> ChatResult<RetentionOutcome> {
        let cutoff = now - Duration::days(self.cfg.retention_days());
        let mut examined = 0usize;
        let mut removed = 0usize;

        for id in scan_conversation_ids(&self.cfg.conversations_dir()) {
            examined += 1;
            let service = ConversationService::with_id(self.cfg.clone(), id.clone());

            let conversation = match service.read() {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(conversation_id = %id, error = %e, "skipping unreadable conversation");
                    continue;
                }
            };

            if conversation.last_activity() < cutoff {
                service.delete()?;
                removed += 1;
            }
        }

        tracing::info!(examined, removed, "retention sweep complete");
        Ok(RetentionOutcome { examined, removed })
    }
}
