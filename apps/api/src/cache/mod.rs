//! Two-tier response cache: a bounded in-process map in front of a persistent
//! row store. Keys are `"{service}:{method}:{params}"`. The persistent tier is
//! the source of truth; the memory tier exists to keep repeated reads within
//! the TTL window off the database entirely.
//!
//! Caching is strictly best-effort: every persistent-tier failure degrades to
//! a miss (on read) or a skipped write, never to a caller-visible error.

pub mod backend;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::backend::{CacheBackend, CacheRow};

pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);
pub const DEFAULT_CAPACITY: usize = 100;

struct MemoryEntry {
    data: serde_json::Value,
    expires_at: Instant,
}

/// Memory tier: map plus insertion order. Eviction is oldest-inserted-first,
/// not LRU — reads do not bump an entry's position.
struct MemoryTier {
    entries: HashMap<String, MemoryEntry>,
    order: VecDeque<String>,
}

pub struct CacheStore {
    backend: Option<Arc<dyn CacheBackend>>,
    capacity: usize,
    default_ttl: Duration,
    memory: Mutex<MemoryTier>,
}

impl CacheStore {
    pub fn new(
        backend: Option<Arc<dyn CacheBackend>>,
        capacity: usize,
        default_ttl: Duration,
    ) -> Self {
        Self {
            backend,
            capacity,
            default_ttl,
            memory: Mutex::new(MemoryTier {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Memory-only store with default sizing, used in tests and as a degraded
    /// mode when no database is available.
    pub fn in_memory() -> Self {
        Self::new(None, DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    fn key(service: &str, method: &str, params: &str) -> String {
        format!("{service}:{method}:{params}")
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        service: &str,
        method: &str,
        params: &str,
    ) -> Option<T> {
        let key = Self::key(service, method, params);

        // Memory tier, with lazy expiry on read.
        {
            let mut tier = self.memory.lock().expect("cache lock poisoned");
            match tier.entries.get(&key) {
                Some(entry) if Instant::now() < entry.expires_at => {
                    let value = entry.data.clone();
                    drop(tier);
                    debug!("cache hit (memory): {key}");
                    return decode(&key, value);
                }
                Some(_) => {
                    tier.entries.remove(&key);
                    tier.order.retain(|k| k != &key);
                }
                None => {}
            }
        }

        // Persistent tier; a hit is written back into the memory tier.
        let backend = self.backend.as_ref()?;
        match backend.fetch(&key).await {
            Ok(Some(row)) => {
                let remaining = match (row.expires_at - Utc::now()).to_std() {
                    Ok(d) if !d.is_zero() => d,
                    _ => {
                        if let Err(e) = backend.delete(&key).await {
                            warn!("failed to delete expired cache row {key}: {e}");
                        }
                        return None;
                    }
                };
                let value: serde_json::Value = match serde_json::from_str(&row.data) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("corrupt cache row {key}: {e}");
                        return None;
                    }
                };
                self.insert_memory(key.clone(), value.clone(), remaining);
                debug!("cache hit (persistent): {key}");
                decode(&key, value)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("persistent cache read failed for {key}: {e}");
                None
            }
        }
    }

    /// Writes to both tiers. Null payloads are dropped: an absent result is
    /// "nothing to cache", not a cacheable answer.
    pub async fn set<T: Serialize>(
        &self,
        service: &str,
        method: &str,
        params: &str,
        data: &T,
        ttl: Option<Duration>,
    ) {
        let key = Self::key(service, method, params);
        let value = match serde_json::to_value(data) {
            Ok(v) => v,
            Err(e) => {
                warn!("refusing to cache unserializable payload for {key}: {e}");
                return;
            }
        };
        if value.is_null() {
            warn!("skipping cache write of null payload for {key}");
            return;
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        self.insert_memory(key.clone(), value.clone(), ttl);

        if let Some(backend) = &self.backend {
            let now = Utc::now();
            let row = CacheRow {
                cache_key: key.clone(),
                data: value.to_string(),
                created_at: now,
                expires_at: now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(6)),
            };
            if let Err(e) = backend.upsert(&row).await {
                warn!("persistent cache write failed for {key}: {e}");
            }
        }
    }

    pub async fn invalidate(&self, service: &str, method: &str, params: &str) {
        let key = Self::key(service, method, params);
        {
            let mut tier = self.memory.lock().expect("cache lock poisoned");
            tier.entries.remove(&key);
            tier.order.retain(|k| k != &key);
        }
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.delete(&key).await {
                warn!("persistent cache delete failed for {key}: {e}");
            }
        }
    }

    /// Deletes every entry whose key contains `pattern`, across both tiers.
    /// Used to drop all cached data for one username at once.
    pub async fn invalidate_pattern(&self, pattern: &str) {
        {
            let mut tier = self.memory.lock().expect("cache lock poisoned");
            tier.entries.retain(|k, _| !k.contains(pattern));
            tier.order.retain(|k| !k.contains(pattern));
        }
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.delete_like(pattern).await {
                warn!("persistent cache pattern delete failed for '{pattern}': {e}");
            }
        }
    }

    pub async fn clear_all(&self) {
        {
            let mut tier = self.memory.lock().expect("cache lock poisoned");
            tier.entries.clear();
            tier.order.clear();
        }
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.clear().await {
                warn!("persistent cache clear failed: {e}");
            }
        }
    }

    pub fn memory_len(&self) -> usize {
        self.memory.lock().expect("cache lock poisoned").entries.len()
    }

    fn insert_memory(&self, key: String, data: serde_json::Value, ttl: Duration) {
        let mut tier = self.memory.lock().expect("cache lock poisoned");
        if tier.entries.contains_key(&key) {
            // Re-insert counts as a fresh insertion for eviction ordering.
            tier.order.retain(|k| k != &key);
        }
        tier.entries.insert(
            key.clone(),
            MemoryEntry {
                data,
                expires_at: Instant::now() + ttl,
            },
        );
        tier.order.push_back(key);

        // `order` mirrors `entries` exactly, so the front is always the
        // oldest-inserted live entry.
        while tier.entries.len() > self.capacity {
            let Some(oldest) = tier.order.pop_front() else {
                break;
            };
            tier.entries.remove(&oldest);
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: serde_json::Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("cached payload for {key} does not match requested shape: {e}");
            None
        }
    }
}
