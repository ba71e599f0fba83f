//! # Solace Core
//!
//! Core business logic for the Solace mental-health chat service.
//!
//! This crate contains the deterministic message-safety pipeline and the
//! conversation store:
//! - Reasoning-leakage sanitisation with a configurable pattern catalogue
//! - Structured-envelope detection and display-text extraction
//! - Deterministic render-key derivation for deduplication
//! - Conversation storage with sharded JSON layout
//! - Maintenance services: retention sweep, compliance report, nudge
//!   candidates, backfill sanitisation
//!
//! **No API concerns**: HTTP servers, streaming channels, and the
//! safety-classifier collaborator belong in `api-rest`; the client-side
//! render pipeline belongs in `solace-client`.

pub mod backfill;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod dedup;
pub mod envelope;
pub mod error;
pub mod message;
pub mod nudge;
pub mod patterns;
pub mod policy;
pub mod report;
pub mod repositories;
pub mod retention;
pub mod sanitiser;
pub mod validation;

pub use config::CoreConfig;
pub use conversation::{Conversation, ConversationMeta};
pub use dedup::RenderKey;
pub use error::{ChatError, ChatResult};
pub use message::{Message, Role};
pub use patterns::{PatternFamily, PatternSet};
pub use policy::{fallback_sentence, generic_ack, FallbackPolicy};
pub use report::{ComplianceReport, ComplianceService};
pub use sanitiser::{MatchedLine, MessageDisposition, SanitiseOutcome, Sanitiser};
