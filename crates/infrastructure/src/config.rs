//! Environment configuration.
//!
//! The subsystem has a single externally tunable value: the base URL of
//! the backend API.

use thiserror::Error;
use url::Url;

/// Environment variable holding the backend base URL.
const ENV_BASE_URL: &str = "WARDEN_API_URL";

/// Base URL used when the environment provides none.
const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured base URL could not be parsed.
    #[error("invalid base URL {url:?}: {message}")]
    InvalidBaseUrl {
        /// The offending value.
        url: String,
        /// Parser diagnostic.
        message: String,
    },
}

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL all request paths are resolved against.
    pub base_url: Url,
}

impl ApiConfig {
    /// Creates a configuration, normalizing the base URL to end with a
    /// slash so relative paths append instead of replacing the last
    /// segment.
    #[must_use]
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { base_url }
    }

    /// Reads the configuration from the environment, falling back to the
    /// localhost default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the configured value
    /// is not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw,
            message: e.to_string(),
        })?;
        Ok(Self::new(base_url))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn base_url_gains_a_trailing_slash() {
        let config = ApiConfig::new(Url::parse("https://api.example.com/v1").unwrap());
        assert_eq!(config.base_url.as_str(), "https://api.example.com/v1/");
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        let config = ApiConfig::new(Url::parse("https://api.example.com/v1/").unwrap());
        assert_eq!(config.base_url.as_str(), "https://api.example.com/v1/");
    }
}
