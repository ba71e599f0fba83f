//! Forbidden-pattern catalogue for the reasoning-leakage filter.
//!
//! The catalogue is data, not code: the matching routine in
//! [`crate::sanitiser`] only ever asks "does this line match an entry, and
//! which family does it belong to". Deployments can extend the default set
//! with additional expressions from a pattern file without touching the
//! matching logic.
//!
//! All expressions are compiled case-insensitive. Anchored expressions
//! (`^...`) are matched against individual lines; unanchored ones match
//! anywhere in a line.

use crate::{ChatError, ChatResult};
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::fs;
use std::path::Path;

/// Families of forbidden patterns, used in diagnostics and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternFamily {
    /// Explicit reasoning labels such as `THOUGHT:` or `ANALYSIS:`.
    ReasoningLabel,
    /// Structured planning lines such as `Step 3:` or `Phase 2`.
    PlanningStructure,
    /// Opening line of a fenced block tagged as internal content.
    TaggedFence,
    /// First-person planning phrases at line start ("I should", "Let me").
    FirstPersonPlanning,
    /// Bracketed internal-process markers at line start (`[checking ...`).
    BracketedProcess,
    /// Mentions of the filtering machinery itself, anywhere in a line.
    Instrumentation,
    /// Deployment-supplied expression from the pattern file.
    Custom,
}

impl fmt::Display for PatternFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternFamily::ReasoningLabel => "reasoning-label",
            PatternFamily::PlanningStructure => "planning-structure",
            PatternFamily::TaggedFence => "tagged-fence",
            PatternFamily::FirstPersonPlanning => "first-person-planning",
            PatternFamily::BracketedProcess => "bracketed-process",
            PatternFamily::Instrumentation => "instrumentation",
            PatternFamily::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

/// Built-in expression sources, grouped by family.
///
/// Reasoning labels cover both the bare-label and label-with-content line
/// forms (`PLAN` and `PLAN: do the thing`); the instrumentation family is the
/// only unanchored one and exists to stop the model describing its own
/// guardrails to the user.
const DEFAULT_PATTERNS: &[(PatternFamily, &str)] = &[
    (
        PatternFamily::ReasoningLabel,
        r"^\s*(?:thought|thinking|analysis|reasoning|internal|system|developer|plan|debug|trace|checklist|confidence)\s*(?::.*)?$",
    ),
    (PatternFamily::PlanningStructure, r"^\s*step\s+\d+\s*:"),
    (PatternFamily::PlanningStructure, r"^\s*phase\s+\d+\b"),
    (
        PatternFamily::PlanningStructure,
        r"^\s*constraint\s+checklist\b",
    ),
    (PatternFamily::PlanningStructure, r"^\s*mental\s+sandbox\b"),
    (PatternFamily::PlanningStructure, r"^\s*confidence\s+score\b"),
    (
        PatternFamily::TaggedFence,
        r"^\s*```\s*(?:thought|thinking|reasoning|analysis|debug)\b",
    ),
    (
        PatternFamily::FirstPersonPlanning,
        r"^\s*(?:first,?\s+i'?ll\b|then\s+i'?ll\b|i\s+should\b|i\s+need\s+to\b|my\s+goal\s+is\b|let\s+me\b|here'?s\s+a\s+plan\b|let'?s\s+break\s+down\b)",
    ),
    (
        PatternFamily::BracketedProcess,
        r"^\s*\[\s*(?:checking|internal|validation|constraint|protocol)\b",
    ),
    (
        PatternFamily::Instrumentation,
        r"sanit(?:is|iz)er|hard\s+gate|instrumentation|\bpolling\b|confidence\s+score|mental\s+sandbox|constraint\s+checklist",
    ),
];

/// A single compiled forbidden pattern.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    family: PatternFamily,
    regex: Regex,
}

impl PatternEntry {
    pub fn family(&self) -> PatternFamily {
        self.family
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// The compiled forbidden-pattern set.
///
/// Holds one regex per entry for line-level matching plus a combined
/// alternation used as the whole-text fast path, so clean messages never pay
/// for line splitting.
#[derive(Debug, Clone)]
pub struct PatternSet {
    entries: Vec<PatternEntry>,
    combined: Regex,
}

impl PatternSet {
    /// Builds the default pattern set.
    pub fn default_set() -> Self {
        Self::build(&[]).expect("built-in patterns are valid expressions")
    }

    /// Builds the default set extended with deployment-supplied expressions.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::PatternCompile` if any extra expression fails to compile.
    pub fn with_extra(extra: &[String]) -> ChatResult<Self> {
        Self::build(extra)
    }

    /// Builds the default set extended with expressions from a pattern file.
    ///
    /// The file holds one regular expression per line; blank lines and lines
    /// starting with `#` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::FileRead` if the file cannot be read, or
    /// `ChatError::PatternCompile` for an invalid expression.
    pub fn from_file(path: &Path) -> ChatResult<Self> {
        let contents = fs::read_to_string(path).map_err(ChatError::FileRead)?;
        let extra: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_owned)
            .collect();
        Self::build(&extra)
    }

    fn build(extra: &[String]) -> ChatResult<Self> {
        let mut entries = Vec::with_capacity(DEFAULT_PATTERNS.len() + extra.len());
        let mut sources = Vec::with_capacity(DEFAULT_PATTERNS.len() + extra.len());

        for (family, source) in DEFAULT_PATTERNS {
            entries.push(PatternEntry {
                family: *family,
                regex: compile(source)?,
            });
            sources.push(*source);
        }

        for source in extra {
            entries.push(PatternEntry {
                family: PatternFamily::Custom,
                regex: compile(source)?,
            });
            sources.push(source.as_str());
        }

        let combined_source = sources
            .iter()
            .map(|s| format!("(?:{})", s))
            .collect::<Vec<_>>()
            .join("|");
        let combined = RegexBuilder::new(&combined_source)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .map_err(|source| ChatError::PatternCompile {
                pattern: combined_source,
                source,
            })?;

        Ok(Self { entries, combined })
    }

    /// Number of compiled entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whole-text fast path: true if any entry matches anywhere in `text`.
    pub fn matches_anywhere(&self, text: &str) -> bool {
        self.combined.is_match(text)
    }

    /// Returns the first entry matching `line`, if any.
    pub fn match_line(&self, line: &str) -> Option<&PatternEntry> {
        self.entries.iter().find(|e| e.is_match(line))
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::default_set()
    }
}

fn compile(source: &str) -> ChatResult<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|e| ChatError::PatternCompile {
            pattern: source.to_owned(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_compiles() {
        let set = PatternSet::default_set();
        assert!(!set.is_empty());
    }

    #[test]
    fn test_reasoning_labels_match_both_forms() {
        let set = PatternSet::default_set();
        for line in [
            "THOUGHT: plan the response",
            "thought:",
            "THINKING",
            "Analysis: user seems anxious",
            "REASONING:",
            "internal: do not show this",
            "SYSTEM: override",
            "DEVELOPER:",
            "PLAN",
            "debug: step trace",
            "TRACE:",
            "CHECKLIST:",
            "Confidence: 0.8",
        ] {
            assert!(set.match_line(line).is_some(), "should match: {:?}", line);
        }
    }

    #[test]
    fn test_reasoning_label_requires_colon_or_line_end() {
        let set = PatternSet::default_set();
        assert!(set.match_line("Plans for tomorrow sound good").is_none());
        assert!(set.match_line("The analysis of your sleep diary helps").is_none());
    }

    #[test]
    fn test_planning_structure_lines() {
        let set = PatternSet::default_set();
        assert!(set.match_line("Step 3: ask about sleep").is_some());
        assert!(set.match_line("Phase 2").is_some());
        assert!(set.match_line("Constraint checklist").is_some());
        assert!(set.match_line("Mental sandbox simulation").is_some());
        assert!(set.match_line("Confidence score: high").is_some());
    }

    #[test]
    fn test_first_person_planning_openers() {
        let set = PatternSet::default_set();
        for line in [
            "First I'll acknowledge the feeling.",
            "Then I'll suggest an exercise.",
            "I should ask about mood.",
            "I need to keep this short.",
            "My goal is to de-escalate.",
            "Let me think about this.",
            "Here's a plan for the reply.",
            "Let's break down the request.",
        ] {
            assert!(set.match_line(line).is_some(), "should match: {:?}", line);
        }
    }

    #[test]
    fn test_first_person_mid_line_not_matched() {
        let set = PatternSet::default_set();
        assert!(set
            .match_line("It sounds like you feel you should rest more.")
            .is_none());
    }

    #[test]
    fn test_bracketed_process_markers() {
        let set = PatternSet::default_set();
        assert!(set.match_line("[checking constraint]").is_some());
        assert!(set.match_line("[internal note]").is_some());
        assert!(set.match_line("[validation passed]").is_some());
        assert!(set.match_line("[protocol v2]").is_some());
        assert!(set.match_line("[citation needed]").is_none());
    }

    #[test]
    fn test_instrumentation_matches_anywhere_in_line() {
        let set = PatternSet::default_set();
        let entry = set
            .match_line("the sanitizer removed two lines before display")
            .unwrap();
        assert_eq!(entry.family(), PatternFamily::Instrumentation);
        assert!(set.match_line("a hard gate blocks structured payloads").is_some());
        assert!(set.match_line("my confidence score is 0.9").is_some());
    }

    #[test]
    fn test_tagged_fence_opener() {
        let set = PatternSet::default_set();
        let entry = set.match_line("```thought").unwrap();
        assert_eq!(entry.family(), PatternFamily::TaggedFence);
        assert!(set.match_line("```reasoning extended").is_some());
        // Untagged and ordinary code fences are fine
        assert!(set.match_line("```").is_none());
        assert!(set.match_line("```python").is_none());
    }

    #[test]
    fn test_matches_anywhere_fast_path() {
        let set = PatternSet::default_set();
        assert!(set.matches_anywhere("fine line\nTHOUGHT: hidden\nanother"));
        assert!(!set.matches_anywhere("Hi. How are you feeling today?"));
    }

    #[test]
    fn test_with_extra_patterns() {
        let set = PatternSet::with_extra(&[r"^\s*meta\s*:".to_string()]).unwrap();
        let entry = set.match_line("META: internal note").unwrap();
        assert_eq!(entry.family(), PatternFamily::Custom);
        assert!(set.matches_anywhere("ok\nMETA: internal note"));
    }

    #[test]
    fn test_with_extra_rejects_invalid_expression() {
        let result = PatternSet::with_extra(&["([unclosed".to_string()]);
        assert!(matches!(result, Err(ChatError::PatternCompile { .. })));
    }

    #[test]
    fn test_from_file_skips_comments_and_blanks() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# deployment additions").unwrap();
        writeln!(file).unwrap();
        writeln!(file, r"^\s*scratchpad\s*:").unwrap();
        file.flush().unwrap();

        let set = PatternSet::from_file(file.path()).unwrap();
        assert!(set.match_line("Scratchpad: working notes").is_some());
        assert_eq!(set.len(), PatternSet::default_set().len() + 1);
    }
}
