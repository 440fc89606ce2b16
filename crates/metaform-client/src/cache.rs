//! Schema cache: TTL'd get/set with key and pattern invalidation.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Cache contract shared by in-process and remote tiers.
///
/// Writers must invalidate every entry for an affected schema name before
/// reporting success, so reads within the same process are never stale
/// relative to a completed write.
#[async_trait]
pub trait SchemaCache: Send + Sync {
    /// Look up a cached value.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store a value with a time-to-live.
    async fn set(&self, key: &str, value: Value, ttl: Duration);

    /// Drop one entry.
    async fn invalidate(&self, key: &str);

    /// Drop every entry whose key matches a glob pattern (`*` matches any
    /// run of characters, `?` exactly one).
    async fn invalidate_pattern(&self, pattern: &str);
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// In-process [`SchemaCache`] over a concurrent map.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Counters exposed for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing or an expired entry.
    pub misses: u64,
    /// Live entries, including not-yet-collected expired ones.
    pub entries: usize,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current hit/miss counters and entry count.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

#[async_trait]
impl SchemaCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > Instant::now() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
        }
        // Expired entries are collected on the lookup that finds them.
        self.entries
            .remove_if(key, |_, entry| entry.expires_at <= Instant::now());
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    async fn invalidate_pattern(&self, pattern: &str) {
        self.entries.retain(|key, _| !glob_match(pattern, key));
    }
}

/// Match `text` against a glob pattern where `*` matches any run of
/// characters and `?` matches exactly one.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == '?' || pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = star {
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }
    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }
    pi == pattern.len()
}
