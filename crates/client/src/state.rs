//! Rendered chat state.
//!
//! The bubble list is the only persistent state on the client side. It is
//! exclusively owned and mutated by the pipeline that created it; lifecycle
//! (creation at mount, drop at teardown) is the owner's, not a module's.

use solace_core::{RenderKey, Role};
use solace_types::DisplayText;

/// One rendered chat bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub key: RenderKey,
    pub role: Role,
    pub text: DisplayText,
}

/// Ordered bubble list with at most one entry per render key.
///
/// Also owns the response-cycle counter used to key partial updates of an
/// in-flight assistant turn.
#[derive(Debug, Default)]
pub struct RenderState {
    bubbles: Vec<Bubble>,
    next_cycle: u64,
    active_cycle: Option<u64>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Starts a new assistant response cycle and returns its synthetic key.
    ///
    /// Every partial update of the cycle reuses this key, so the rendered
    /// list holds exactly one bubble for the turn however many deliveries it
    /// takes to complete.
    pub fn begin_response_cycle(&mut self) -> u64 {
        let cycle = self.next_cycle;
        self.next_cycle += 1;
        self.active_cycle = Some(cycle);
        cycle
    }

    /// Ends the current response cycle, if any.
    pub fn end_response_cycle(&mut self) {
        self.active_cycle = None;
    }

    pub fn active_cycle(&self) -> Option<u64> {
        self.active_cycle
    }

    /// Inserts a bubble, or replaces the existing bubble with the same key
    /// in place. Position in the list never changes on replacement.
    pub fn upsert(&mut self, bubble: Bubble) {
        match self.bubbles.iter_mut().find(|b| b.key == bubble.key) {
            Some(existing) => *existing = bubble,
            None => self.bubbles.push(bubble),
        }
    }

    /// Replaces the whole list with a reconciled result.
    pub fn replace_all(&mut self, bubbles: Vec<Bubble>) {
        self.bubbles = bubbles;
    }
}
