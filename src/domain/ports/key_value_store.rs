//! Key-Value Store Port
//!
//! Defines the interface for the TTL-bearing byte store that holds the
//! reference datasets, the per-country details cache and the distance
//! aggregate.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Store for string-keyed byte values with per-key TTLs.
///
/// This is an outbound port that abstracts the cache backend.
/// Implementations may use Redis or in-memory storage. An absent key is an
/// `Ok(None)` read, distinct from a store failure.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Check whether a key currently holds a live value.
    async fn exists(&self, key: &str) -> anyhow::Result<bool>;

    /// Read the value stored at a key, or None when the key is absent
    /// or its TTL has elapsed.
    async fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>>;

    /// Write a value, optionally expiring after `ttl`. A None TTL means
    /// the value never expires.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> anyhow::Result<()>;
}
