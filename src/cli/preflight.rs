//! Pre-flight checks before operations that need the model API.

use crate::config::{Settings, API_KEY_ENV};
use crate::error::{AideError, Result};

/// Fail when no API key is configured. Every model-backed command needs one.
pub fn check() -> Result<()> {
    match Settings::api_key() {
        Some(_) => Ok(()),
        None => Err(AideError::Config(api_key_hint())),
    }
}

/// Hint printed when no API key is configured.
pub fn api_key_hint() -> String {
    format!(
        "{} not set. Set it with: export {}='sk-...' or add it to a .env file",
        API_KEY_ENV, API_KEY_ENV
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_names_variable() {
        assert!(api_key_hint().contains("OPENAI_API_KEY"));
    }
}
