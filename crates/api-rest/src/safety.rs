//! Safety-classifier collaborator.
//!
//! A separate, independent filter layer from the deterministic leakage
//! sanitiser: an external model reviews the candidate assistant text for
//! harmful or medical-claim content and, when unsafe, supplies a substitute
//! message. The collaborator is best-effort - classifier failure is logged
//! and treated as safe, leaving the deterministic pipeline as the line of
//! defence.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Verdict returned by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyVerdict {
    /// True when the text may be stored and shown as-is.
    pub safe: bool,
    /// Replacement text to store instead when `safe` is false.
    #[serde(default)]
    pub substitute: Option<String>,
}

impl SafetyVerdict {
    pub fn safe() -> Self {
        Self {
            safe: true,
            substitute: None,
        }
    }
}

/// Errors from a classifier implementation.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Transport(String),
    #[error("classifier returned a malformed verdict: {0}")]
    MalformedVerdict(String),
}

/// Post-generation review of candidate assistant text.
#[async_trait]
pub trait SafetyClassifier: Send + Sync {
    async fn review(&self, candidate_text: &str) -> Result<SafetyVerdict, ClassifierError>;
}

/// No-op classifier used when no classifier endpoint is configured.
pub struct DisabledClassifier;

#[async_trait]
impl SafetyClassifier for DisabledClassifier {
    async fn review(&self, _candidate_text: &str) -> Result<SafetyVerdict, ClassifierError> {
        Ok(SafetyVerdict::safe())
    }
}

#[derive(Serialize)]
struct ReviewRequest<'a> {
    text: &'a str,
}

/// HTTP classifier calling an external review endpoint.
///
/// Expects `POST <url>` with `{"text": ...}` to answer with a
/// [`SafetyVerdict`] JSON body.
pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl SafetyClassifier for HttpClassifier {
    async fn review(&self, candidate_text: &str) -> Result<SafetyVerdict, ClassifierError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ReviewRequest {
                text: candidate_text,
            })
            .send()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        response
            .json::<SafetyVerdict>()
            .await
            .map_err(|e| ClassifierError::MalformedVerdict(e.to_string()))
    }
}
