//! Client configuration.

use std::time::Duration;

use crate::error::{Error, InvalidInputError};
use crate::types::ApiUrl;

/// Environment variable holding the backend base URL.
pub const API_BASE_ENV: &str = "PETNEST_API_BASE";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "PETNEST_HTTP_TIMEOUT_SECS";

/// Settings for an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address every endpoint path is appended to.
    pub api_base: ApiUrl,
    /// Per-request timeout. `None` leaves it to the transport defaults.
    pub timeout: Option<Duration>,
    /// User-Agent header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration for `api_base` with default settings.
    pub fn new(api_base: ApiUrl) -> Self {
        Self {
            api_base,
            timeout: None,
            user_agent: concat!("petnest/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `PETNEST_API_BASE` is unset or invalid, or if
    /// `PETNEST_HTTP_TIMEOUT_SECS` is not a positive integer.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration through `lookup` instead of the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = lookup(API_BASE_ENV).ok_or_else(|| InvalidInputError::Env {
            key: API_BASE_ENV.to_string(),
            reason: "not set".to_string(),
        })?;
        let mut config = Self::new(ApiUrl::new(base.trim())?);

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| InvalidInputError::Env {
                    key: TIMEOUT_ENV.to_string(),
                    reason: format!("expected a positive integer, got '{}'", raw),
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn reads_base_and_timeout() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_BASE_ENV, "https://api.petnest.example"),
            (TIMEOUT_ENV, "15"),
        ]))
        .unwrap();

        assert_eq!(config.api_base.host(), Some("api.petnest.example"));
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert!(config.user_agent.starts_with("petnest/"));
    }

    #[test]
    fn missing_base_is_an_error() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains(API_BASE_ENV));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            (API_BASE_ENV, "https://api.petnest.example"),
            (TIMEOUT_ENV, "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(TIMEOUT_ENV));
    }

    #[test]
    fn timeout_defaults_to_none() {
        let config =
            ClientConfig::from_lookup(lookup(&[(API_BASE_ENV, "http://localhost:3001")])).unwrap();
        assert!(config.timeout.is_none());
    }
}
