use std::env;

/// Errors from API key validation.
#[derive(Debug, PartialEq, Eq)]
pub enum ApiKeyError {
    /// `API_KEY` is not set in the environment.
    NotConfigured,
    /// The provided key does not match.
    Invalid,
}

/// Validates the provided API key against the expected API key from environment.
///
/// Returns `Ok(())` if the key is valid, or an error if invalid or missing.
pub fn validate_api_key(provided_key: &str) -> Result<(), ApiKeyError> {
    let expected_key = env::var("API_KEY").map_err(|_| ApiKeyError::NotConfigured)?;

    if provided_key == expected_key {
        Ok(())
    } else {
        Err(ApiKeyError::Invalid)
    }
}
