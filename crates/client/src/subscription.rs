//! Live-update subscription loop.
//!
//! Batches arrive on a channel and are processed serially - there is no
//! parallel handling of batches. Each loop turn drains everything already
//! queued, commits the safe batches, and coalesces however many unsafe
//! batches it saw into a single canonical refetch. A failed refetch is
//! logged and the previous render state stays on screen; the next good
//! update overwrites it.

use crate::fetch::ConversationFetcher;
use crate::gate::RenderGate;
use crate::state::RenderState;
use solace_core::Message;
use tokio::sync::mpsc;

/// Consumes a conversation's live-update channel into render state.
pub struct Subscription<F: ConversationFetcher> {
    conversation_id: String,
    gate: RenderGate,
    state: RenderState,
    fetcher: F,
}

impl<F: ConversationFetcher> Subscription<F> {
    pub fn new(conversation_id: impl Into<String>, gate: RenderGate, fetcher: F) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            gate,
            state: RenderState::new(),
            fetcher,
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Starts a new assistant response cycle; partial updates of the turn
    /// will share one bubble.
    pub fn begin_response_cycle(&mut self) -> u64 {
        self.state.begin_response_cycle()
    }

    pub fn end_response_cycle(&mut self) {
        self.state.end_response_cycle()
    }

    /// Processes one delivered batch.
    ///
    /// Safe batch: committed directly, zero refetches. Unsafe batch: nothing
    /// rendered, exactly one canonical refetch. Refetch failure leaves the
    /// previous state untouched.
    pub async fn process_batch(&mut self, batch: Vec<Message>) {
        if self.gate.batch_is_safe(&batch) {
            self.gate.commit_batch(&mut self.state, &batch);
            return;
        }

        tracing::warn!(
            conversation_id = %self.conversation_id,
            batch_len = batch.len(),
            "unsafe batch blocked from render"
        );
        self.refetch().await;
    }

    /// Runs until the channel closes.
    ///
    /// Each wake-up drains every batch already queued. Unsafe batches seen
    /// in one drain trigger a single refetch between them - the canonical
    /// result is authoritative and supersedes any intermediate state, so
    /// per-batch refetches would be redundant network calls.
    pub async fn run(&mut self, mut rx: mpsc::Receiver<Vec<Message>>) {
        while let Some(first) = rx.recv().await {
            let mut pending = vec![first];
            while let Ok(more) = rx.try_recv() {
                pending.push(more);
            }

            let mut needs_refetch = false;
            for batch in pending {
                if self.gate.batch_is_safe(&batch) {
                    self.gate.commit_batch(&mut self.state, &batch);
                } else {
                    tracing::warn!(
                        conversation_id = %self.conversation_id,
                        batch_len = batch.len(),
                        "unsafe batch blocked from render"
                    );
                    needs_refetch = true;
                }
            }

            if needs_refetch {
                self.refetch().await;
            }
        }
    }

    async fn refetch(&mut self) {
        if let Err(e) = self
            .gate
            .reconcile(&mut self.state, &self.fetcher, &self.conversation_id)
            .await
        {
            tracing::error!(
                conversation_id = %self.conversation_id,
                error = %e,
                "canonical refetch failed; keeping previous render state"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use async_trait::async_trait;
    use chrono::Utc;
    use solace_core::constants::CLIENT_MIN_CLEAN_CHARS;
    use solace_core::{
        Conversation, ConversationMeta, FallbackPolicy, PatternSet, Role, Sanitiser,
    };
    use solace_types::Language;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const CONVERSATION_ID: &str = "550e8400e29b41d4a716446655440000";

    fn gate() -> RenderGate {
        RenderGate::new(
            Sanitiser::new(
                PatternSet::default_set(),
                FallbackPolicy::FailOpen,
                CLIENT_MIN_CLEAN_CHARS,
            ),
            Language::En,
        )
    }

    fn canonical(messages: Vec<Message>) -> Conversation {
        Conversation {
            meta: ConversationMeta {
                conversation_id: CONVERSATION_ID.into(),
                owner: "alex@example.org".into(),
                language: Language::En,
                created_at: Utc::now(),
            },
            messages,
        }
    }

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
        result: Result<Conversation, ()>,
    }

    #[async_trait]
    impl ConversationFetcher for CountingFetcher {
        async fn fetch_conversation(
            &self,
            conversation_id: &str,
        ) -> Result<Conversation, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .map_err(|_| FetchError::Transport(conversation_id.to_owned()))
        }
    }

    fn message_with_id(role: Role, id: &str, text: &str) -> Message {
        let mut msg = Message::text(role, text, Utc::now());
        msg.id = Some(id.into());
        msg
    }

    fn unsafe_message(id: &str) -> Message {
        Message {
            id: Some(id.into()),
            role: Role::Assistant,
            content: serde_json::json!({"assistant_message": "hidden inside"}),
            metadata: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_safe_batch_commits_without_refetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: calls.clone(),
            result: Ok(canonical(vec![])),
        };
        let mut sub = Subscription::new(CONVERSATION_ID, gate(), fetcher);

        sub.process_batch(vec![
            message_with_id(Role::User, "m1", "hi there"),
            message_with_id(Role::Assistant, "m2", "hello, how are you?"),
        ])
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(sub.state().len(), 2);
    }

    #[tokio::test]
    async fn test_unsafe_batch_triggers_exactly_one_refetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: calls.clone(),
            result: Ok(canonical(vec![message_with_id(
                Role::Assistant,
                "m1",
                "recovered from the store",
            )])),
        };
        let mut sub = Subscription::new(CONVERSATION_ID, gate(), fetcher);

        sub.process_batch(vec![
            message_with_id(Role::User, "m0", "a fine message"),
            unsafe_message("m1"),
        ])
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Nothing from the blocked batch leaked through; state is canonical
        assert_eq!(sub.state().len(), 1);
        assert_eq!(
            sub.state().bubbles()[0].text.as_str(),
            "recovered from the store"
        );
    }

    #[tokio::test]
    async fn test_refetch_failure_preserves_previous_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: calls.clone(),
            result: Err(()),
        };
        let mut sub = Subscription::new(CONVERSATION_ID, gate(), fetcher);

        sub.process_batch(vec![message_with_id(Role::User, "m1", "already shown")])
            .await;
        sub.process_batch(vec![unsafe_message("m2")]).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(sub.state().len(), 1);
        assert_eq!(sub.state().bubbles()[0].text.as_str(), "already shown");
    }

    #[tokio::test]
    async fn test_queued_unsafe_batches_coalesce_into_one_refetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: calls.clone(),
            result: Ok(canonical(vec![message_with_id(
                Role::Assistant,
                "m1",
                "authoritative result",
            )])),
        };
        let mut sub = Subscription::new(CONVERSATION_ID, gate(), fetcher);

        let (tx, rx) = mpsc::channel(8);
        tx.send(vec![unsafe_message("m1")]).await.unwrap();
        tx.send(vec![unsafe_message("m2")]).await.unwrap();
        tx.send(vec![unsafe_message("m3")]).await.unwrap();
        drop(tx);

        sub.run(rx).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(sub.state().len(), 1);
        assert_eq!(
            sub.state().bubbles()[0].text.as_str(),
            "authoritative result"
        );
    }

    #[tokio::test]
    async fn test_streaming_partials_render_one_bubble() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: calls.clone(),
            result: Ok(canonical(vec![])),
        };
        let mut sub = Subscription::new(CONVERSATION_ID, gate(), fetcher);
        sub.begin_response_cycle();

        // Partial deliveries of the same turn: no id, fresh timestamp each time
        sub.process_batch(vec![Message::text(Role::Assistant, "I hear", Utc::now())])
            .await;
        sub.process_batch(vec![Message::text(
            Role::Assistant,
            "I hear you. Take a slow breath.",
            Utc::now(),
        )])
        .await;
        sub.end_response_cycle();

        assert_eq!(sub.state().len(), 1);
        assert_eq!(
            sub.state().bubbles()[0].text.as_str(),
            "I hear you. Take a slow breath."
        );
    }
}
