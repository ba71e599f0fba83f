/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input was not a recognised two-letter language tag
    #[error("Unknown language tag: '{0}'")]
    UnknownLanguage(String),
}

/// A string type that guarantees non-empty, displayable content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
/// Chat bubbles are only ever built from `DisplayText`, so an empty bubble cannot be
/// represented at the type level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayText(String);

impl DisplayText {
    /// Creates a new `DisplayText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(DisplayText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for DisplayText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DisplayText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for DisplayText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for DisplayText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DisplayText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Display language for a conversation.
///
/// Controls which fixed fallback sentence is substituted when a message is
/// filtered down to nothing. Tags are the two-letter forms used by the chat
/// frontend; anything unrecognised is rejected at the boundary rather than
/// silently defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (default display language)
    En,
    /// Hebrew
    He,
}

impl Language {
    /// Parses a two-letter language tag.
    ///
    /// # Errors
    ///
    /// Returns `TextError::UnknownLanguage` if the tag is not supported.
    pub fn parse(tag: &str) -> Result<Self, TextError> {
        match tag.trim() {
            "en" => Ok(Language::En),
            "he" => Ok(Language::He),
            other => Err(TextError::UnknownLanguage(other.to_owned())),
        }
    }

    /// Returns the two-letter tag for this language.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::He => "he",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl std::str::FromStr for Language {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_trims_input() {
        let text = DisplayText::new("  hello  ").unwrap();
        assert_eq!(text.as_str(), "hello");
    }

    #[test]
    fn test_display_text_rejects_empty() {
        assert!(DisplayText::new("").is_err());
        assert!(DisplayText::new("   \n\t  ").is_err());
    }

    #[test]
    fn test_language_parse_known_tags() {
        assert_eq!(Language::parse("en").unwrap(), Language::En);
        assert_eq!(Language::parse("he").unwrap(), Language::He);
        assert_eq!(Language::parse(" he ").unwrap(), Language::He);
    }

    #[test]
    fn test_language_parse_unknown_tag() {
        let result = Language::parse("fr");
        assert!(result.is_err());
        match result {
            Err(TextError::UnknownLanguage(tag)) => assert_eq!(tag, "fr"),
            _ => panic!("Expected UnknownLanguage error"),
        }
    }

    #[test]
    fn test_language_round_trip() {
        for lang in [Language::En, Language::He] {
            assert_eq!(Language::parse(lang.tag()).unwrap(), lang);
        }
    }
}
