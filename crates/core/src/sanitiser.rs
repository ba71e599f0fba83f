//! Reasoning-leakage sanitisation for chat messages.
//!
//! The upstream model occasionally leaks internal planning text (reasoning
//! labels, step lists, bracketed process markers) into what should be a clean
//! user-facing reply. This module removes such lines before a message is
//! persisted or rendered, and guarantees a non-empty result under the default
//! fail-open policy.
//!
//! The same contract is enforced independently at two boundaries: the server
//! runs it before persisting an assistant turn, the client runs it again
//! immediately before render. Both call sites share this one implementation;
//! only the minimum-length threshold differs between them.

use crate::constants::SERVER_MIN_CLEAN_CHARS;
use crate::message::Message;
use crate::patterns::{PatternFamily, PatternSet};
use crate::policy::FallbackPolicy;
use serde_json::Value;
use solace_types::Language;

/// Maximum characters of a removed line carried in diagnostics.
const MATCH_FRAGMENT_MAX_CHARS: usize = 80;

/// A removed (or would-be-removed) line, for observability dashboards.
///
/// Never user-visible. The fragment is truncated so diagnostics cannot
/// themselves become a leak of arbitrary length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedLine {
    /// 1-based line number within the original text.
    pub line_number: usize,
    /// Which pattern family matched.
    pub family: PatternFamily,
    /// Truncated copy of the offending line.
    pub fragment: String,
}

impl MatchedLine {
    fn new(line_number: usize, family: PatternFamily, line: &str) -> Self {
        let fragment: String = line.chars().take(MATCH_FRAGMENT_MAX_CHARS).collect();
        Self {
            line_number,
            family,
            fragment,
        }
    }
}

/// Result of one sanitisation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitiseOutcome {
    /// Cleaned text to display. `None` only under the fail-closed policy,
    /// meaning the turn is suppressed. Under fail-open this is always `Some`
    /// and non-empty for non-empty input.
    pub text: Option<String>,
    /// True when any line was removed or a fallback was substituted.
    pub altered: bool,
    /// Diagnostics describing what was removed.
    pub removed: Vec<MatchedLine>,
}

impl SanitiseOutcome {
    fn unchanged(text: &str) -> Self {
        Self {
            text: Some(text.to_owned()),
            altered: false,
            removed: Vec::new(),
        }
    }
}

/// What happened to a message passed through [`Sanitiser::sanitise_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDisposition {
    /// Content was already clean; message untouched.
    Unchanged,
    /// Content was rewritten in place and flagged in metadata.
    Rewritten,
    /// The fail-closed policy suppressed the turn; caller decides its fate.
    Suppressed,
}

/// Service applying the forbidden-pattern filter to message text.
///
/// Pure and deterministic: the same input and language always yield the same
/// output, with no network or storage access. Construct once at startup with
/// the resolved pattern set and policy, then share freely.
#[derive(Debug, Clone)]
pub struct Sanitiser {
    patterns: PatternSet,
    policy: FallbackPolicy,
    min_clean_chars: usize,
}

impl Sanitiser {
    /// Creates a sanitiser over the given pattern set.
    ///
    /// `min_clean_chars` is the threshold below which a cleaned result is
    /// treated as effectively empty; the server and client enforce different
    /// values at their respective call sites.
    pub fn new(patterns: PatternSet, policy: FallbackPolicy, min_clean_chars: usize) -> Self {
        Self {
            patterns,
            policy,
            min_clean_chars,
        }
    }

    /// Default-configured sanitiser: built-in patterns, fail-open policy,
    /// server-side threshold.
    pub fn with_defaults() -> Self {
        Self::new(
            PatternSet::default_set(),
            FallbackPolicy::FailOpen,
            SERVER_MIN_CLEAN_CHARS,
        )
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Removes reasoning-leakage lines from `raw`.
    ///
    /// Empty input is returned unchanged (callers type-gate non-string
    /// content before reaching this function). The common clean case is a
    /// single combined-pattern test with no line splitting. Otherwise each
    /// non-blank line is tested against the pattern set and dropped on a
    /// match; a fenced block whose opening line is tagged as internal is
    /// dropped wholesale up to its closing fence. Blank lines and non-matching
    /// lines are kept, rejoined, and trimmed.
    ///
    /// If the cleaned result falls below the minimum length, the configured
    /// [`FallbackPolicy`] decides between the fixed localised sentence
    /// (fail-open) and suppression (fail-closed).
    pub fn sanitise(&self, raw: &str, language: Language) -> SanitiseOutcome {
        if raw.is_empty() {
            return SanitiseOutcome::unchanged(raw);
        }

        // Fast path: no forbidden pattern anywhere, return the input as-is.
        if !self.patterns.matches_anywhere(raw) {
            return SanitiseOutcome::unchanged(raw);
        }

        let mut kept: Vec<&str> = Vec::new();
        let mut removed: Vec<MatchedLine> = Vec::new();
        let mut in_tagged_fence = false;

        for (idx, line) in raw.lines().enumerate() {
            let line_number = idx + 1;
            let trimmed = line.trim();

            if in_tagged_fence {
                removed.push(MatchedLine::new(
                    line_number,
                    PatternFamily::TaggedFence,
                    line,
                ));
                if trimmed == "```" {
                    in_tagged_fence = false;
                }
                continue;
            }

            if trimmed.is_empty() {
                kept.push(line);
                continue;
            }

            match self.patterns.match_line(line) {
                Some(entry) => {
                    if entry.family() == PatternFamily::TaggedFence {
                        in_tagged_fence = true;
                    }
                    tracing::debug!(
                        family = %entry.family(),
                        line_number,
                        "dropped leaked line"
                    );
                    removed.push(MatchedLine::new(line_number, entry.family(), line));
                }
                None => kept.push(line),
            }
        }

        if removed.is_empty() {
            // The combined expression matched across a line boundary that no
            // single line reproduces; nothing to remove.
            return SanitiseOutcome::unchanged(raw);
        }

        let cleaned = kept.join("\n").trim().to_owned();

        if cleaned.chars().count() >= self.min_clean_chars {
            return SanitiseOutcome {
                text: Some(cleaned),
                altered: true,
                removed,
            };
        }

        match self.policy.replacement(language) {
            Some(sentence) => SanitiseOutcome {
                text: Some(sentence.to_owned()),
                altered: true,
                removed,
            },
            None => SanitiseOutcome {
                text: None,
                altered: true,
                removed,
            },
        }
    }

    /// True if any forbidden pattern matches anywhere in `text`.
    ///
    /// Detection only - nothing is removed. Used for metrics and the
    /// compliance report, never for gating.
    pub fn has_leakage(&self, text: &str) -> bool {
        self.patterns.matches_anywhere(text)
    }

    /// Which lines would be removed, and why.
    ///
    /// Recomputed fresh on every call; the fragments are truncated. Intended
    /// for debugging dashboards.
    pub fn extract_matches(&self, text: &str) -> Vec<MatchedLine> {
        let mut matches = Vec::new();
        let mut in_tagged_fence = false;

        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();

            if in_tagged_fence {
                matches.push(MatchedLine::new(idx + 1, PatternFamily::TaggedFence, line));
                if trimmed == "```" {
                    in_tagged_fence = false;
                }
                continue;
            }

            if trimmed.is_empty() {
                continue;
            }

            if let Some(entry) = self.patterns.match_line(line) {
                if entry.family() == PatternFamily::TaggedFence {
                    in_tagged_fence = true;
                }
                matches.push(MatchedLine::new(idx + 1, entry.family(), line));
            }
        }

        matches
    }

    /// Applies the filter to a stored assistant message, in place.
    ///
    /// Only assistant turns with plain-string content are candidates; user
    /// turns and structured content pass through untouched. A rewrite records
    /// `"sanitised": true` in the message metadata so the alteration is
    /// visible to the compliance report.
    pub fn sanitise_message(&self, message: &mut Message, language: Language) -> MessageDisposition {
        if !message.is_assistant() {
            return MessageDisposition::Unchanged;
        }

        let raw = match message.content.as_str() {
            Some(s) => s.to_owned(),
            None => return MessageDisposition::Unchanged,
        };

        let outcome = self.sanitise(&raw, language);
        if !outcome.altered {
            return MessageDisposition::Unchanged;
        }

        match outcome.text {
            Some(clean) => {
                message.content = Value::String(clean);
                let meta = message
                    .metadata
                    .get_or_insert_with(|| Value::Object(serde_json::Map::new()));
                if let Some(map) = meta.as_object_mut() {
                    map.insert("sanitised".to_owned(), Value::Bool(true));
                }
                MessageDisposition::Rewritten
            }
            None => MessageDisposition::Suppressed,
        }
    }
}

impl Default for Sanitiser {
    fn default() -> Self {
        Self::with_defaults()
    }
}
