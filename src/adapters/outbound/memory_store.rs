//! In-Memory Key-Value Store
//!
//! Implements KeyValueStore using DashMap for lock-free concurrent access.
//! Serves as the fallback backend when no Redis URL is configured and as
//! the store fake in tests. Values are non-persistent.

use crate::domain::ports::KeyValueStore;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct StoredEntry {
    value: Bytes,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline <= now)
    }
}

/// DashMap-backed key-value store with per-entry expiry.
///
/// Expired entries are dropped lazily on access; there is no background
/// sweeper because the working set is a handful of well-known keys.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: DashMap<String, StoredEntry>,
}

impl InMemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Read a live entry, removing it when its TTL has elapsed.
    fn live_value(&self, key: &str) -> Option<Bytes> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        } else {
            return None;
        }

        self.entries.remove(key);
        None
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.live_value(key).is_some())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        Ok(self.live_value(key))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> anyhow::Result<()> {
        let entry = StoredEntry {
            value: Bytes::copy_from_slice(value),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }
}
