//! Per-entry TTL store backed by moka
//!
//! moka bounds the size of each keyspace; expiry is tracked per entry so one
//! store can hold values with different lifetimes and so tests can drive the
//! clock through tokio's paused time.

use async_trait::async_trait;
use moka::future::Cache;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

/// Cached value with its expiry instant
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Entry expiring `ttl` from now
    #[must_use]
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Whether the entry is stale at `now`
    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Keyspace operations used by the catalog cache
#[async_trait]
pub trait CacheStore<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Live value for `key`; stale entries are dropped and reported as a miss
    async fn get(&self, key: &K) -> Option<V>;

    /// Store `value` for `ttl`
    async fn set(&self, key: K, value: V, ttl: Duration);

    /// Remove `key` immediately
    async fn invalidate(&self, key: &K);

    /// Remove every key accepted by `predicate`; returns how many were removed
    async fn invalidate_matching(&self, predicate: &(dyn for<'a> Fn(&'a K) -> bool + Send + Sync)) -> usize;

    /// Remove everything
    async fn invalidate_all(&self);

    /// Drop stale entries; returns how many were removed
    async fn clear_expired(&self) -> usize;

    /// Current number of entries
    async fn len(&self) -> u64;
}

/// moka-backed [`CacheStore`]
#[derive(Clone)]
pub struct TtlCache<K, V> {
    name: &'static str,
    inner: Cache<K, CacheEntry<V>>,
}

impl<K, V> Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a named keyspace bounded to `max_capacity` entries
    #[must_use]
    pub fn new(name: &'static str, max_capacity: u64) -> Self {
        Self {
            name,
            inner: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// Keyspace name used in log events
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn stale_keys(&self, now: Instant) -> Vec<std::sync::Arc<K>> {
        self.inner
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key)
            .collect()
    }
}

#[async_trait]
impl<K, V> CacheStore<K, V> for TtlCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let Some(entry) = self.inner.get(key).await else {
            tracing::debug!(cache = self.name, ?key, "cache miss");
            return None;
        };
        if entry.is_expired_at(Instant::now()) {
            self.inner.invalidate(key).await;
            tracing::debug!(cache = self.name, ?key, "cache entry expired");
            return None;
        }
        tracing::debug!(cache = self.name, ?key, "cache hit");
        Some(entry.value)
    }

    async fn set(&self, key: K, value: V, ttl: Duration) {
        self.inner.insert(key, CacheEntry::new(value, ttl)).await;
    }

    async fn invalidate(&self, key: &K) {
        tracing::debug!(cache = self.name, ?key, "cache invalidate");
        self.inner.invalidate(key).await;
    }

    async fn invalidate_matching(&self, predicate: &(dyn for<'a> Fn(&'a K) -> bool + Send + Sync)) -> usize {
        let keys: Vec<_> = self
            .inner
            .iter()
            .map(|(key, _)| key)
            .filter(|key| predicate(&**key))
            .collect();
        for key in &keys {
            self.inner.invalidate(&**key).await;
        }
        keys.len()
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }

    async fn clear_expired(&self) -> usize {
        let stale = self.stale_keys(Instant::now());
        for key in &stale {
            self.inner.invalidate(&**key).await;
        }
        if !stale.is_empty() {
            tracing::debug!(cache = self.name, removed = stale.len(), "swept expired entries");
        }
        stale.len()
    }

    async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}
