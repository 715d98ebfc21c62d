//! In-memory cache layer for reducing API calls
//!
//! TTL-based caching of per-symbol validation verdicts: repeated
//! validation of the same symbol within the TTL window is served from
//! memory instead of hitting the exchanges again.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Cache entry with TTL
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(value: T, ttl_secs: i64) -> Self {
        Self {
            value,
            expires_at: Utc::now() + Duration::seconds(ttl_secs),
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// String-keyed TTL cache
#[derive(Debug, Clone)]
pub struct TtlCache<T: Clone> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    default_ttl: i64,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(default_ttl_secs: i64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: default_ttl_secs,
        }
    }

    /// Get a value (None if expired or not found)
    pub fn get(&self, key: &str) -> Option<T> {
        let cache = self.entries.read();
        cache.get(key).and_then(|entry| {
            if entry.is_expired() {
                None
            } else {
                Some(entry.value.clone())
            }
        })
    }

    /// Store a value under the default TTL
    pub fn set(&self, key: &str, value: T) {
        let mut cache = self.entries.write();
        cache.insert(key.to_string(), CacheEntry::new(value, self.default_ttl));
    }

    /// Drop everything
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Drop expired entries
    pub fn cleanup(&self) {
        let mut cache = self.entries.write();
        cache.retain(|_, entry| !entry.is_expired());
    }

    /// Get cache stats
    pub fn stats(&self) -> CacheStats {
        let cache = self.entries.read();
        let total = cache.len();
        let expired = cache.values().filter(|e| e.is_expired()).count();
        CacheStats {
            total_entries: total,
            expired_entries: expired,
            valid_entries: total - expired,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub valid_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let cache: TtlCache<String> = TtlCache::new(60);
        cache.set("BTC/USDT", "verdict".to_string());

        assert_eq!(cache.get("BTC/USDT"), Some("verdict".to_string()));
    }

    #[test]
    fn test_cache_miss() {
        let cache: TtlCache<String> = TtlCache::new(60);
        assert!(cache.get("nonexistent").is_none());
    }

    #[test]
    fn test_expired_entry_not_returned() {
        // zero TTL expires immediately
        let cache: TtlCache<u32> = TtlCache::new(-1);
        cache.set("key", 1);
        assert!(cache.get("key").is_none());
    }

    #[test]
    fn test_clear() {
        let cache: TtlCache<u32> = TtlCache::new(60);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.clear();
        assert!(cache.get("a").is_none());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_cleanup_drops_expired_only() {
        let live: TtlCache<u32> = TtlCache::new(3600);
        live.set("a", 1);
        live.set("b", 2);
        live.cleanup();
        assert_eq!(live.stats().valid_entries, 2);

        let dead: TtlCache<u32> = TtlCache::new(-1);
        dead.set("a", 1);
        dead.cleanup();
        assert_eq!(dead.stats().total_entries, 0);
    }

    #[test]
    fn test_overwrite_refreshes_value() {
        let cache: TtlCache<u32> = TtlCache::new(60);
        cache.set("key", 1);
        cache.set("key", 2);
        assert_eq!(cache.get("key"), Some(2));
        assert_eq!(cache.stats().total_entries, 1);
    }
}
