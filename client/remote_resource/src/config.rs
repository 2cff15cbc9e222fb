//! Client configuration loaded from environment variables.

use std::time::Duration;

use crate::errors::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address of the marketplace API (e.g. https://api.example.com)
    pub base_url: String,
    /// Per-request timeout enforced by the transport
    pub request_timeout_secs: u64,
    /// Cancel a resource's in-flight request as soon as a newer one supersedes it
    pub abort_superseded: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
            abort_superseded: true,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.  `from_env` delegates
    /// here so parsing can be exercised without touching process state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ClientConfig::default();
        let env_var = |key: &str| {
            lookup(key).ok_or_else(|| ClientError::Config(format!("Missing env var: {key}")))
        };

        let base_url = env_var("API_BASE_URL").unwrap_or(defaults.base_url);
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "API_BASE_URL must be an http(s) address, got {base_url:?}"
            )));
        }

        let request_timeout_secs: u64 = env_var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults.request_timeout_secs.to_string())
            .parse()
            .map_err(|_| ClientError::Config("Invalid REQUEST_TIMEOUT_SECS".to_string()))?;
        if request_timeout_secs == 0 {
            return Err(ClientError::Config(
                "REQUEST_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        Ok(ClientConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout_secs,
            abort_superseded: env_var("ABORT_SUPERSEDED")
                .unwrap_or_else(|_| defaults.abort_superseded.to_string())
                .parse()
                .map_err(|_| ClientError::Config("Invalid ABORT_SUPERSEDED".to_string()))?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
