//! Internal implementation of the identifier types.
//!
//! Conversation ids and the UUID half of message ids share one canonical
//! representation; this module owns that representation and the time-prefixed
//! message id format built on top of it.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Solace's canonical UUID representation (32 lowercase hex characters, no hyphens).
///
/// This wrapper type guarantees that once constructed, the contained UUID is in Solace's
/// canonical format. It provides type safety for UUID operations and ensures consistent
/// path derivation across the system.
///
/// # When to use this type
/// Use this wrapper whenever you are:
/// - Accepting a conversation id from *outside* the core (CLI input, API request, etc), or
/// - Deriving a sharded storage path for a conversation, or
/// - Generating new conversation identifiers.
///
/// Once you have a `UuidService`, you can safely assume the internal UUID is valid
/// and in canonical form.
///
/// # Construction
/// - [`UuidService::new`] generates a new canonical UUID (for new conversations).
/// - [`UuidService::parse`] validates an externally supplied identifier.
///
/// # Errors
/// [`UuidService::parse`] returns [`UuidError::InvalidInput`] if the input is not already
/// canonical.
///
/// # Display format
/// When displayed or converted to string, `UuidService` always produces the canonical
/// 32-character lowercase hex format without hyphens.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UuidService(Uuid);

impl Default for UuidService {
    fn default() -> Self {
        Self::new()
    }
}

impl UuidService {
    /// Allocates a fresh identifier (RFC 4122 v4) for a new conversation.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates an externally supplied identifier, requiring canonical form.
    ///
    /// Hyphenated and uppercase forms are deliberately **not** normalised:
    /// every id that enters the system is stored and compared in exactly one
    /// representation, so anything else is rejected at the boundary.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] when `input` is not canonical.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }

        // Canonical form is exactly 128 bits of lowercase hex
        let value = u128::from_str_radix(input, 16)
            .expect("is_canonical guarantees 32 hex digits");
        Ok(Self(Uuid::from_u128(value)))
    }

    /// Returns the wrapped `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in Solace's canonical UUID form.
    ///
    /// This is a purely syntactic check: exactly 32 bytes, each a digit or a
    /// lowercase `a`-`f`. Useful for pre-validation before calling
    /// [`UuidService::parse`].
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    /// Derives the conversation's storage directory under `parent_dir`.
    ///
    /// The layout is `parent_dir/<first two hex chars>/<next two>/<full id>/`,
    /// which keeps any single directory's fan-out small however many
    /// conversations accumulate.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let (s1, rest) = canonical.split_at(2);
        let (s2, _) = rest.split_at(2);
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for UuidService {
    /// Always prints the canonical form (32 lowercase hex, no hyphens).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for UuidService {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UuidService::parse(s)
    }
}

/// A time-prefixed message identifier.
///
/// Format:
/// `YYYYMMDDTHHMMSS.mmmZ-<canonical_uuid>`
///
/// Example:
/// `20260111T143522.045Z-550e8400e29b41d4a716446655440000`
///
/// This identifier is:
/// - Globally unique (UUID)
/// - Human-readable
/// - Monotonic per conversation when generated against the previous message's id
///
/// # Monotonicity Guarantee
///
/// When calling [`TimestampUuid::generate`] with the previous message id, the timestamp is
/// guaranteed to be strictly greater than the previous one (incremented by at least 1 ms if
/// necessary). This keeps messages within a conversation strictly ordered even when two
/// appends land on the same clock millisecond.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimestampUuid {
    timestamp: DateTime<Utc>,
    uuid: UuidService,
}

impl TimestampUuid {
    /// Returns the timestamp component of this message id.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns a reference to the UUID component of this message id.
    pub fn uuid(&self) -> &UuidService {
        &self.uuid
    }

    /// Generate a new message id, strictly after `last_uid` when one is given
    /// (the timestamp is bumped by at least 1 ms if the clock has not moved).
    ///
    /// Designed to be called while holding the conversation's store lock.
    pub fn generate(last_uid: Option<&TimestampUuid>) -> Self {
        let now = Utc::now();

        let timestamp = match last_uid {
            Some(prev) if now <= prev.timestamp => prev.timestamp + Duration::milliseconds(1),
            _ => now,
        };

        Self {
            timestamp,
            uuid: UuidService::new(),
        }
    }

    /// Generate a new message id, parsing the previous id from its string form first.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `last_uid` is present but malformed.
    pub fn generate_from_str(last_uid: Option<&str>) -> UuidResult<Self> {
        let parsed = match last_uid {
            Some(s) => Some(TimestampUuid::from_str(s)?),
            None => None,
        };

        Ok(Self::generate(parsed.as_ref()))
    }
}

impl FromStr for TimestampUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ts_str, uuid_str) = s
            .split_once('-')
            .ok_or_else(|| UuidError::InvalidInput(format!("malformed message id: '{}'", s)))?;

        let ts_no_z = ts_str.strip_suffix('Z').ok_or_else(|| {
            UuidError::InvalidInput(format!("message id timestamp must end with 'Z': '{}'", ts_str))
        })?;

        let naive =
            chrono::NaiveDateTime::parse_from_str(ts_no_z, "%Y%m%dT%H%M%S%.3f").map_err(|e| {
                UuidError::InvalidInput(format!("bad message id timestamp '{}': {}", ts_str, e))
            })?;

        Ok(Self {
            timestamp: DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc),
            uuid: UuidService::parse(uuid_str)?,
        })
    }
}

impl fmt::Display for TimestampUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.timestamp.format("%Y%m%dT%H%M%S%.3fZ"),
            self.uuid
        )
    }
}
