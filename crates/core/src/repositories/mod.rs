//! Conversation storage repositories.
//!
//! Conversations live on the filesystem under a sharded directory layout
//! derived from their canonical UUID (see `solace-uuid`). Each conversation
//! directory holds a YAML metadata file and a JSON message log. Services use
//! the type-state pattern so operations on a non-existent conversation are a
//! compile error, not a runtime surprise.

pub mod conversations;
pub(crate) mod shared;

pub use conversations::{
    list_conversations, ConversationService, Initialised, Uninitialised,
};
