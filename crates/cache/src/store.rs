use crate::error::CacheError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// A key/value store with per-entry time-to-live.
///
/// Implementations may be in-process or external; callers only rely on
/// "a fresh value or nothing".
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// The stored value, or `None` when missing or past its TTL.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
    pub inserts: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Inner {
    entries: HashMap<String, CacheEntry>,
    metrics: CacheMetrics,
}

/// In-process `CacheStore`. Expired entries are dropped lazily on read, and
/// when full the entry closest to expiry is evicted.
pub struct InMemoryCache {
    max_entries: usize,
    inner: RwLock<Inner>,
}

impl InMemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                metrics: CacheMetrics::default(),
            }),
        }
    }

    pub async fn metrics(&self) -> CacheMetrics {
        self.inner.read().await.metrics.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes every expired entry. Returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - inner.entries.len();
        inner.metrics.expirations += removed as u64;
        removed
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new(1_000)
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let now = Instant::now();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let expired = match inner.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                let value = entry.value.clone();
                inner.metrics.hits += 1;
                return Ok(Some(value));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.entries.remove(key);
            inner.metrics.expirations += 1;
        }
        inner.metrics.misses += 1;
        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if !inner.entries.contains_key(key) && inner.entries.len() >= self.max_entries {
            inner.entries.retain(|_, entry| !entry.is_expired(now));
            if inner.entries.len() >= self.max_entries {
                let victim = inner
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(victim) = victim {
                    tracing::debug!(key = %victim, "Evicting cache entry to make room.");
                    inner.entries.remove(&victim);
                    inner.metrics.evictions += 1;
                }
            }
        }

        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
        inner.metrics.inserts += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryCache::new(10);
        cache.set("k", json!({"v": 1}), Duration::from_secs(60)).await.unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"v": 1})));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);

        let metrics = cache.metrics().await;
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.expirations, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cache_evicts_soonest_expiry() {
        let cache = InMemoryCache::new(2);
        cache.set("short", json!(1), Duration::from_secs(10)).await.unwrap();
        cache.set("long", json!(2), Duration::from_secs(100)).await.unwrap();
        cache.set("new", json!(3), Duration::from_secs(50)).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("short").await.unwrap(), None);
        assert_eq!(cache.get("long").await.unwrap(), Some(json!(2)));
        assert_eq!(cache.metrics().await.evictions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = InMemoryCache::new(10);
        cache.set("a", json!(1), Duration::from_secs(5)).await.unwrap();
        cache.set("b", json!(2), Duration::from_secs(50)).await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_hit_rate() {
        let cache = InMemoryCache::default();
        assert_eq!(cache.metrics().await.hit_rate(), 0.0);
        cache.set("a", json!(1), Duration::from_secs(5)).await.unwrap();
        cache.get("a").await.unwrap();
        cache.get("b").await.unwrap();
        assert!((cache.metrics().await.hit_rate() - 0.5).abs() < 1e-9);
    }
}
