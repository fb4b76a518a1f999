//! Navigator configuration

use crate::error::NavError;
use atlas_cache::CacheConfig;
use atlas_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Navigator configuration, loadable from TOML
///
/// ```toml
/// min_loading_ms = 300
/// group_resize_debounce_ms = 1000
///
/// [cache]
/// diagram_ttl_ms = 120000
///
/// [client]
/// base_url = "https://api.example.com"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Minimum time the loading indicator stays visible
    pub min_loading_ms: u64,
    /// Rolling window for group-resize events
    pub group_resize_debounce_ms: u64,
    /// Buffer of the event and notification channels
    pub event_capacity: usize,
    pub cache: CacheConfig,
    pub client: ClientConfig,
}

impl NavigatorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// `NavError::Config` for malformed input.
    pub fn from_toml_str(raw: &str) -> Result<Self, NavError> {
        toml::from_str(raw).map_err(|e| NavError::Config(e.to_string()))
    }

    /// With minimum loading duration
    #[inline]
    #[must_use]
    pub fn with_min_loading(mut self, duration: Duration) -> Self {
        self.min_loading_ms = millis(duration);
        self
    }

    /// With group-resize debounce window
    #[inline]
    #[must_use]
    pub fn with_group_resize_debounce(mut self, window: Duration) -> Self {
        self.group_resize_debounce_ms = millis(window);
        self
    }

    /// With cache configuration
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// With client configuration
    #[inline]
    #[must_use]
    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn min_loading(&self) -> Duration {
        Duration::from_millis(self.min_loading_ms)
    }

    #[must_use]
    pub fn group_resize_debounce(&self) -> Duration {
        Duration::from_millis(self.group_resize_debounce_ms)
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            min_loading_ms: 300,
            group_resize_debounce_ms: 1_000,
            event_capacity: 64,
            cache: CacheConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
