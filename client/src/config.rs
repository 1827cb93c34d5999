//! Configuration management for the client.

use std::env;
use std::time::Duration;

/// Base URL used when `API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
/// Request timeout used when `API_TIMEOUT` is not set.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every request path is appended to
    pub api_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Bearer token sent with every request
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            auth_token: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = api_url.trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(api_url));
        }

        let timeout = match lookup("API_TIMEOUT") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT,
        };

        let auth_token = lookup("API_TOKEN").filter(|t| !t.trim().is_empty());

        Ok(Self {
            api_url,
            timeout,
            auth_token,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_URL must be an http(s) URL, got '{0}'")]
    InvalidUrl(String),

    #[error("API_TIMEOUT must be a positive number of milliseconds, got '{0}'")]
    InvalidTimeout(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
