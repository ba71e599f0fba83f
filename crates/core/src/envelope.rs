//! Structured-envelope detection and display-text extraction.
//!
//! Message content is supposed to be a plain display string, but the upstream
//! agent can deliver its whole JSON envelope instead - either as a real
//! object or as a string that still carries the serialised envelope. These
//! helpers classify such content and recover the user-facing string from it,
//! falling back to a generic acknowledgment when no display field is
//! recognisable. Extraction failures are logged and recovered locally; they
//! are never surfaced to the user.

use crate::constants::ASSISTANT_MESSAGE_FIELD;
use crate::policy::generic_ack;
use serde_json::Value;
use solace_types::Language;

/// True if a string payload looks like a serialised agent envelope rather
/// than display text: once trimmed it starts with `{` or `[{` and mentions
/// the envelope's display field.
pub fn looks_like_structured(text: &str) -> bool {
    let trimmed = text.trim_start();
    (trimmed.starts_with('{') || trimmed.starts_with("[{"))
        && text.contains(ASSISTANT_MESSAGE_FIELD)
}

/// True if this content may be committed to render state as-is.
///
/// Unsafe content is anything that is not a string, or a string that looks
/// like a serialised envelope. Detection only - recovery is the hard gate's
/// job.
pub fn is_safe_content(content: &Value) -> bool {
    match content.as_str() {
        Some(s) => !looks_like_structured(s),
        None => false,
    }
}

/// Extracts the display string from message content of any shape.
///
/// Plain strings are trimmed and returned. Structured content (an object, an
/// array of objects, or a string that still carries the serialised envelope)
/// yields the envelope's display field when present; otherwise the generic
/// localised acknowledgment. A string that looks structured but fails to
/// parse is logged and treated the same way.
pub fn extract_display_text(content: &Value, language: Language) -> String {
    match content {
        Value::String(s) => {
            if !looks_like_structured(s) {
                return s.trim().to_owned();
            }
            match serde_json::from_str::<Value>(s) {
                Ok(parsed) => extract_from_value(&parsed, language),
                Err(e) => {
                    tracing::debug!(error = %e, "structured-looking content failed to parse");
                    generic_ack(language).to_owned()
                }
            }
        }
        other => extract_from_value(other, language),
    }
}

fn extract_from_value(value: &Value, language: Language) -> String {
    let field = match value {
        Value::Object(map) => map.get(ASSISTANT_MESSAGE_FIELD).and_then(Value::as_str),
        Value::Array(items) => items
            .iter()
            .find_map(|item| item.get(ASSISTANT_MESSAGE_FIELD).and_then(Value::as_str)),
        _ => None,
    };

    match field {
        Some(s) if !s.trim().is_empty() => s.trim().to_owned(),
        _ => {
            tracing::debug!("structured content carries no recognisable display field");
            generic_ack(language).to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GENERIC_ACK_EN, GENERIC_ACK_HE};
    use serde_json::json;

    #[test]
    fn test_plain_string_is_safe_and_trimmed() {
        let content = Value::String("  How are you feeling today?  ".into());
        assert!(is_safe_content(&content));
        assert_eq!(
            extract_display_text(&content, Language::En),
            "How are you feeling today?"
        );
    }

    #[test]
    fn test_object_content_is_unsafe() {
        let content = json!({"assistant_message": "hello"});
        assert!(!is_safe_content(&content));
    }

    #[test]
    fn test_serialised_envelope_string_is_unsafe() {
        let content = Value::String(r#"{"assistant_message": "hello", "mood": 4}"#.into());
        assert!(!is_safe_content(&content));

        let array_form = Value::String(r#"[{"assistant_message": "hello"}]"#.into());
        assert!(!is_safe_content(&array_form));
    }

    #[test]
    fn test_braced_string_without_field_is_safe() {
        // A user typing literal braces is not an envelope
        let content = Value::String("{just venting} about my day".into());
        assert!(is_safe_content(&content));
    }

    #[test]
    fn test_extract_from_object_prefers_display_field() {
        let content = json!({"assistant_message": " hello there ", "mood_score": 4});
        assert_eq!(extract_display_text(&content, Language::En), "hello there");
    }

    #[test]
    fn test_extract_from_array_takes_first_display_field() {
        let content = json!([{"mood_score": 4}, {"assistant_message": "second item"}]);
        assert_eq!(extract_display_text(&content, Language::En), "second item");
    }

    #[test]
    fn test_extract_from_serialised_envelope_string() {
        let content = Value::String(r#"{"assistant_message": "from the wire"}"#.into());
        assert_eq!(extract_display_text(&content, Language::En), "from the wire");
    }

    #[test]
    fn test_unrecognisable_object_falls_back_to_ack() {
        let content = json!({"mood_score": 4});
        assert_eq!(extract_display_text(&content, Language::En), GENERIC_ACK_EN);
        assert_eq!(extract_display_text(&content, Language::He), GENERIC_ACK_HE);
    }

    #[test]
    fn test_parse_failure_falls_back_to_ack() {
        // Looks structured but is not valid JSON
        let content = Value::String(r#"{"assistant_message": truncated"#.into());
        assert_eq!(extract_display_text(&content, Language::En), GENERIC_ACK_EN);
    }

    #[test]
    fn test_number_content_falls_back_to_ack() {
        let content = json!(42);
        assert!(!is_safe_content(&content));
        assert_eq!(extract_display_text(&content, Language::En), GENERIC_ACK_EN);
    }
}
