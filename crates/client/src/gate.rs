//! The hard render gate.
//!
//! Before any batch of incoming messages is committed to the rendered chat
//! state, every message's content must be a plain string free of raw
//! JSON-envelope shape. One unsafe message blocks the whole batch: nothing
//! from it is rendered, and the canonical conversation is refetched from the
//! store, re-extracted, and re-sanitised before the reconciled result is
//! shown.
//!
//! A safe batch takes a single normalisation pass - extract, trim, sanitise
//! once - and commits in one go. The filter never runs twice on the same
//! content within a commit.

use crate::fetch::{ConversationFetcher, FetchError};
use crate::state::{Bubble, RenderState};
use solace_core::envelope::{extract_display_text, is_safe_content};
use solace_core::{Message, RenderKey, Sanitiser};
use solace_types::{DisplayText, Language};
use std::time::Duration;

/// Ceiling on a canonical refetch before the gate gives up and leaves the
/// previously rendered state intact.
pub const DEFAULT_REFETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the block-and-refetch path.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("canonical refetch timed out")]
    Timeout,
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Batch-level safety gate in front of [`RenderState`].
#[derive(Debug, Clone)]
pub struct RenderGate {
    sanitiser: Sanitiser,
    language: Language,
    refetch_timeout: Duration,
}

impl RenderGate {
    /// Creates a gate with the default refetch timeout.
    ///
    /// The sanitiser should carry the client-side minimum-length threshold;
    /// the server enforces its own at persist time.
    pub fn new(sanitiser: Sanitiser, language: Language) -> Self {
        Self {
            sanitiser,
            language,
            refetch_timeout: DEFAULT_REFETCH_TIMEOUT,
        }
    }

    /// Overrides the refetch timeout (tests, impatient deployments).
    pub fn with_refetch_timeout(mut self, timeout: Duration) -> Self {
        self.refetch_timeout = timeout;
        self
    }

    /// True when every message in the batch may be rendered as-is.
    pub fn batch_is_safe(&self, batch: &[Message]) -> bool {
        batch.iter().all(|m| is_safe_content(&m.content))
    }

    /// Commits a safe batch to render state in one pass.
    ///
    /// Each message is normalised (trim, sanitise once) and upserted under
    /// its derived render key. A turn the fail-closed policy suppresses, or
    /// one that normalises to nothing, simply produces no bubble.
    pub fn commit_batch(&self, state: &mut RenderState, batch: &[Message]) {
        let active_cycle = state.active_cycle();

        for (index, message) in batch.iter().enumerate() {
            let key = RenderKey::derive(message, index, active_cycle);
            if let Some(bubble) = self.bubble_for(key, message) {
                state.upsert(bubble);
            }
        }
    }

    /// Refetches the canonical conversation and replaces render state with
    /// the reconciled result.
    ///
    /// Bounded by the configured timeout; on timeout or fetch failure the
    /// state is left untouched and the error is returned for logging.
    pub async fn reconcile(
        &self,
        state: &mut RenderState,
        fetcher: &dyn ConversationFetcher,
        conversation_id: &str,
    ) -> Result<(), GateError> {
        let fetched =
            tokio::time::timeout(self.refetch_timeout, fetcher.fetch_conversation(conversation_id))
                .await
                .map_err(|_| GateError::Timeout)??;

        let mut bubbles = Vec::with_capacity(fetched.messages.len());
        for (index, message) in fetched.messages.iter().enumerate() {
            let key = RenderKey::derive(message, index, None);
            if let Some(bubble) = self.bubble_for(key, message) {
                bubbles.push(bubble);
            }
        }

        state.replace_all(bubbles);
        tracing::info!(conversation_id, "render state reconciled from canonical fetch");
        Ok(())
    }

    /// One extraction + one sanitisation pass for a single message.
    fn bubble_for(&self, key: RenderKey, message: &Message) -> Option<Bubble> {
        let extracted = extract_display_text(&message.content, self.language);
        let outcome = self.sanitiser.sanitise(&extracted, self.language);
        let text = DisplayText::new(outcome.text?).ok()?;

        Some(Bubble {
            key,
            role: message.role,
            text,
        })
    }
}
