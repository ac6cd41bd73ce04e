// In-memory response cache.
// Entries are replaced on refresh and checked for staleness at read time.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use super::key::CacheKey;

/// Default TTL for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// A cached upstream payload with its storage time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Value,
    pub stored_at: Instant,
}

impl CacheEntry {
    fn new(payload: Value) -> Self {
        Self {
            payload,
            stored_at: Instant::now(),
        }
    }

    /// Check whether this entry is older than the TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }
}

/// Process-wide cache of successful upstream responses.
///
/// Created once at startup and shared by every request handler for the
/// process lifetime. Stale entries are not swept proactively: reads treat
/// them as absent and the next successful fetch overwrites them in place.
/// Writes to the same key race as last-write-wins. The map itself is
/// unbounded, a known limitation that is acceptable for the handful of
/// repositories a session explores.
pub struct ResponseCache {
    ttl: Duration,
    entries: DashMap<CacheKey, CacheEntry>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Return the cached payload for `key` unless it has gone stale.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if entry.is_expired(self.ttl) {
            debug!(key = %key, "cache entry expired");
            return None;
        }
        Some(entry.payload.clone())
    }

    /// Store a payload, replacing any previous entry for `key`.
    pub fn put(&self, key: CacheKey, payload: Value) {
        self.entries.insert(key, CacheEntry::new(payload));
    }
}
