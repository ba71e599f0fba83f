//! Recovery policy for messages consumed entirely by filtering.
//!
//! The product decision is fail-open: a turn that was pure leakage is replaced
//! by a fixed localised sentence rather than dropped, so the user never sees
//! an empty bubble. Fail-closed exists as a named alternative for deployments
//! that prefer suppressing the turn; the choice is configuration, not code.

use crate::constants::{FALLBACK_SENTENCE_EN, FALLBACK_SENTENCE_HE, GENERIC_ACK_EN, GENERIC_ACK_HE};
use crate::{ChatError, ChatResult};
use solace_types::Language;

/// What to do when filtering leaves nothing displayable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Substitute the fixed localised fallback sentence (default).
    FailOpen,
    /// Suppress the turn entirely.
    FailClosed,
}

impl FallbackPolicy {
    /// Parses a policy name from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::InvalidInput` for an unrecognised name.
    pub fn parse(value: &str) -> ChatResult<Self> {
        match value.trim() {
            "fail_open" => Ok(FallbackPolicy::FailOpen),
            "fail_closed" => Ok(FallbackPolicy::FailClosed),
            other => Err(ChatError::InvalidInput(format!(
                "unknown fallback policy '{}' (expected 'fail_open' or 'fail_closed')",
                other
            ))),
        }
    }

    /// The replacement text for an exhausted message, or `None` to suppress it.
    pub fn replacement(&self, language: Language) -> Option<&'static str> {
        match self {
            FallbackPolicy::FailOpen => Some(fallback_sentence(language)),
            FallbackPolicy::FailClosed => None,
        }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::FailOpen
    }
}

/// The fixed sentence substituted when a message was entirely leakage.
pub fn fallback_sentence(language: Language) -> &'static str {
    match language {
        Language::En => FALLBACK_SENTENCE_EN,
        Language::He => FALLBACK_SENTENCE_HE,
    }
}

/// The generic acknowledgment used when a structured payload carries no
/// recognisable display field.
pub fn generic_ack(language: Language) -> &'static str {
    match language {
        Language::En => GENERIC_ACK_EN,
        Language::He => GENERIC_ACK_HE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy_names() {
        assert_eq!(
            FallbackPolicy::parse("fail_open").unwrap(),
            FallbackPolicy::FailOpen
        );
        assert_eq!(
            FallbackPolicy::parse(" fail_closed ").unwrap(),
            FallbackPolicy::FailClosed
        );
        assert!(FallbackPolicy::parse("block").is_err());
    }

    #[test]
    fn test_fail_open_replaces_per_language() {
        assert_eq!(
            FallbackPolicy::FailOpen.replacement(Language::En),
            Some(FALLBACK_SENTENCE_EN)
        );
        assert_eq!(
            FallbackPolicy::FailOpen.replacement(Language::He),
            Some(FALLBACK_SENTENCE_HE)
        );
    }

    #[test]
    fn test_fail_closed_suppresses() {
        assert_eq!(FallbackPolicy::FailClosed.replacement(Language::En), None);
    }
}
