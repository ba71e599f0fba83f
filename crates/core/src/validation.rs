//! Input validation utilities.
//!
//! This module contains functions for validating user inputs to ensure they meet
//! safety and correctness requirements before being used in operations.

use crate::{ChatError, ChatResult};

/// Validates that an owner identity is safe for storage and logging.
///
/// The owner identity is an email address embedded into conversation metadata and log lines.
/// This function applies defensive guardrails against injection or malformed identities:
/// - Rejects empty or whitespace-only strings
/// - Bounds the length to avoid pathological inputs
/// - Restricts characters to a conservative ASCII set
/// - Requires exactly one `@` with non-empty local and domain parts
///
/// # Arguments
///
/// * `owner` - The owner identity string to validate.
///
/// # Errors
///
/// Returns a `ChatError::InvalidInput` if the identity is invalid.
pub fn validate_owner_identity(owner: &str) -> ChatResult<()> {
    const MAX_OWNER_LEN: usize = 254;

    if owner.trim().is_empty() {
        return Err(ChatError::InvalidInput("owner cannot be empty".into()));
    }

    if owner.len() > MAX_OWNER_LEN {
        return Err(ChatError::InvalidInput(format!(
            "owner exceeds maximum length of {} characters",
            MAX_OWNER_LEN
        )));
    }

    if !owner.is_ascii() {
        return Err(ChatError::InvalidInput(
            "owner must contain only ASCII characters".into(),
        ));
    }

    let ok = owner.bytes().all(
        |b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_' | b'+' | b'@'),
    );

    if !ok {
        return Err(ChatError::InvalidInput(
            "owner contains invalid characters (only alphanumeric, '.', '-', '_', '+', '@' allowed)"
                .into(),
        ));
    }

    let mut parts = owner.split('@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || parts.next().is_some() {
        return Err(ChatError::InvalidInput(
            "owner must be an email address with exactly one '@'".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_email() {
        assert!(validate_owner_identity("alex@example.org").is_ok());
        assert!(validate_owner_identity("a.b-c_d+tag@sub.example.org").is_ok());
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert!(validate_owner_identity("").is_err());
        assert!(validate_owner_identity("   ").is_err());
    }

    #[test]
    fn test_rejects_missing_or_doubled_at() {
        assert!(validate_owner_identity("no-at-sign").is_err());
        assert!(validate_owner_identity("two@@example.org").is_err());
        assert!(validate_owner_identity("@example.org").is_err());
        assert!(validate_owner_identity("alex@").is_err());
    }

    #[test]
    fn test_rejects_non_ascii_and_invalid_characters() {
        assert!(validate_owner_identity("אלכס@example.org").is_err());
        assert!(validate_owner_identity("alex smith@example.org").is_err());
        assert!(validate_owner_identity("alex;drop@example.org").is_err());
    }

    #[test]
    fn test_rejects_overlong_identity() {
        let long = format!("{}@example.org", "a".repeat(300));
        assert!(validate_owner_identity(&long).is_err());
    }
}
