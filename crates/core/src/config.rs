//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and injected into
//! services as an `Arc<CoreConfig>`. Request handlers never read environment
//! variables directly; per-request env reads behave inconsistently under
//! multi-threaded runtimes and test harnesses.

use crate::constants::{CONVERSATIONS_DIR_NAME, DEFAULT_NUDGE_QUIET_HOURS, DEFAULT_RETENTION_DAYS};
use crate::policy::FallbackPolicy;
use crate::{ChatError, ChatResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    chat_data_dir: PathBuf,
    retention_days: i64,
    nudge_quiet_hours: i64,
    fallback_policy: FallbackPolicy,
    extra_pattern_file: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        chat_data_dir: PathBuf,
        retention_days: i64,
        nudge_quiet_hours: i64,
        fallback_policy: FallbackPolicy,
        extra_pattern_file: Option<PathBuf>,
    ) -> ChatResult<Self> {
        if retention_days <= 0 {
            return Err(ChatError::InvalidInput(
                "retention_days must be positive".into(),
            ));
        }
        if nudge_quiet_hours <= 0 {
            return Err(ChatError::InvalidInput(
                "nudge_quiet_hours must be positive".into(),
            ));
        }

        Ok(Self {
            chat_data_dir,
            retention_days,
            nudge_quiet_hours,
            fallback_policy,
            extra_pattern_file,
        })
    }

    pub fn chat_data_dir(&self) -> &Path {
        &self.chat_data_dir
    }

    pub fn conversations_dir(&self) -> PathBuf {
        self.chat_data_dir.join(CONVERSATIONS_DIR_NAME)
    }

    pub fn retention_days(&self) -> i64 {
        self.retention_days
    }

    pub fn nudge_quiet_hours(&self) -> i64 {
        self.nudge_quiet_hours
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback_policy
    }

    pub fn extra_pattern_file(&self) -> Option<&Path> {
        self.extra_pattern_file.as_deref()
    }
}

/// Parse the retention window from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default retention window.
pub fn retention_days_from_env_value(value: Option<String>) -> ChatResult<i64> {
    parse_positive_days(value, DEFAULT_RETENTION_DAYS, "retention window")
}

/// Parse the nudge quiet period from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default quiet period.
pub fn nudge_quiet_hours_from_env_value(value: Option<String>) -> ChatResult<i64> {
    parse_positive_days(value, DEFAULT_NUDGE_QUIET_HOURS, "nudge quiet period")
}

fn parse_positive_days(value: Option<String>, default: i64, what: &str) -> ChatResult<i64> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let parsed = match value {
        Some(v) => v
            .parse::<i64>()
            .map_err(|e| ChatError::InvalidInput(format!("invalid {}: {}", what, e)))?,
        None => return Ok(default),
    };

    if parsed <= 0 {
        return Err(ChatError::InvalidInput(format!(
            "{} must be positive, got {}",
            what, parsed
        )));
    }

    Ok(parsed)
}
