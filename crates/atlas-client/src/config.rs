//! HTTP client settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Catalog HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API origin, without the `/api/v1` suffix
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With API origin
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With per-request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Root of every workspace-scoped endpoint
    #[must_use]
    pub fn scope_url(&self, workspace: &str) -> String {
        format!(
            "{}/api/v1/workspaces/{workspace}",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_url_ignores_trailing_slash() {
        let config = ClientConfig::new().with_base_url("https://api.example.com/");
        assert_eq!(
            config.scope_url("w1"),
            "https://api.example.com/api/v1/workspaces/w1"
        );
    }

    #[test]
    fn timeout_round_trips_through_millis() {
        let config = ClientConfig::new().with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.request_timeout_ms, 5_000);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
