//! Client configuration: base URL, request timeout and default headers.
//!
//! Fixed once when the client is constructed. `from_env` lets binaries point
//! the client at another server without code changes.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

const BASE_URL_VAR: &str = "API_BASE_URL";
const TIMEOUT_VAR: &str = "API_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Overall per-request timeout, covering connect, send and receive.
    pub timeout: Duration,
    /// Headers added to every request.
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        if base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        Ok(Self {
            base_url: base_url.to_string(),
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `API_BASE_URL` and `API_TIMEOUT_MS`, falling back to defaults for
    /// unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(BASE_URL_VAR) {
            Some(url) => Self::new(&url)?,
            None => Self::default(),
        };
        if let Some(value) = lookup(TIMEOUT_VAR) {
            let millis = value
                .trim()
                .parse::<u64>()
                .map_err(|source| ConfigError::InvalidTimeout {
                    value: value.clone(),
                    source,
                })?;
            if millis == 0 {
                return Err(ConfigError::ZeroTimeout);
            }
            config.timeout = Duration::from_millis(millis);
        }
        Ok(config)
    }
}
