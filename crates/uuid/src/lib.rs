//! Identifier and sharded-path utilities.
//!
//! Solace keys conversations by UUID and stores each one under a sharded
//! directory derived from that id. To keep path derivation deterministic, a
//! single *canonical* representation is used everywhere: **32 lowercase
//! hexadecimal characters, no hyphens** (what `Uuid::new_v4().simple()`
//! prints), e.g. `550e8400e29b41d4a716446655440000`.
//!
//! Two types enforce this:
//! - [`UuidService`] wraps a UUID that is guaranteed canonical once
//!   constructed. Externally supplied ids (API paths, CLI arguments) go
//!   through [`UuidService::parse`], which rejects hyphenated, uppercase,
//!   truncated, or otherwise non-canonical input.
//! - [`TimestampUuid`] is the time-prefixed message id format, monotonic per
//!   conversation.
//!
//! The sharded layout for an id `u` is `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//! (for example `chat_data/conversations/55/0e/550e8400.../`), bounding the
//! fan-out of any single directory.

mod service;

pub use service::{TimestampUuid, Uuid, UuidService};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// The supplied id text was not in canonical form.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
