//! Cache sizing and lifetimes

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Catalog cache configuration
///
/// Lifetimes are in milliseconds so the struct reads naturally from TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry bound per keyspace
    pub max_capacity: u64,
    /// Environment list lifetime
    pub environments_ttl_ms: u64,
    /// Diagram list lifetime
    pub diagrams_ttl_ms: u64,
    /// Single diagram lifetime
    pub diagram_ttl_ms: u64,
}

impl CacheConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With entry bound per keyspace
    #[inline]
    #[must_use]
    pub fn with_max_capacity(mut self, max: u64) -> Self {
        self.max_capacity = max;
        self
    }

    /// With environment list lifetime
    #[inline]
    #[must_use]
    pub fn with_environments_ttl(mut self, ttl: Duration) -> Self {
        self.environments_ttl_ms = millis(ttl);
        self
    }

    /// With diagram list lifetime
    #[inline]
    #[must_use]
    pub fn with_diagrams_ttl(mut self, ttl: Duration) -> Self {
        self.diagrams_ttl_ms = millis(ttl);
        self
    }

    /// With single diagram lifetime
    #[inline]
    #[must_use]
    pub fn with_diagram_ttl(mut self, ttl: Duration) -> Self {
        self.diagram_ttl_ms = millis(ttl);
        self
    }

    #[must_use]
    pub fn environments_ttl(&self) -> Duration {
        Duration::from_millis(self.environments_ttl_ms)
    }

    #[must_use]
    pub fn diagrams_ttl(&self) -> Duration {
        Duration::from_millis(self.diagrams_ttl_ms)
    }

    #[must_use]
    pub fn diagram_ttl(&self) -> Duration {
        Duration::from_millis(self.diagram_ttl_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            environments_ttl_ms: 10 * 60 * 1_000,
            diagrams_ttl_ms: 5 * 60 * 1_000,
            diagram_ttl_ms: 2 * 60 * 1_000,
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
