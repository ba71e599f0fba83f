//! Canonical conversation fetching.
//!
//! The conversation store is an external collaborator: the client only needs
//! "give me the canonical conversation by id". The trait seam keeps the gate
//! and subscription testable without a network.

use async_trait::async_trait;
use solace_core::Conversation;

/// Errors surfaced by a fetcher implementation.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("conversation not found: {0}")]
    NotFound(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Source of canonical conversation state.
///
/// Implementations are expected to return the *full* ordered conversation;
/// the caller re-applies extraction and sanitisation to every message before
/// anything is shown.
#[async_trait]
pub trait ConversationFetcher: Send + Sync {
    async fn fetch_conversation(&self, conversation_id: &str) -> Result<Conversation, FetchError>;
}
