//! Redis Key-Value Store
//!
//! Implements KeyValueStore over a Redis server. The connection is
//! established lazily and cached; on a command failure the cached
//! connection is dropped so the next call reconnects.

use crate::domain::ports::KeyValueStore;
use async_trait::async_trait;
use bytes::Bytes;
use redis::{aio::MultiplexedConnection, AsyncCommands};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Redis-backed key-value store.
pub struct RedisKeyValueStore {
    client: redis::Client,
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
}

impl RedisKeyValueStore {
    /// Create a store for the given Redis URL (e.g. `redis://127.0.0.1:6379`).
    ///
    /// Only the URL is validated here; the connection itself is established
    /// on first use.
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
        })
    }

    /// Get or establish the cached connection.
    async fn get_connection(&self) -> Result<MultiplexedConnection, redis::RedisError> {
        {
            let guard = self.connection.read().await;
            if let Some(conn) = guard.as_ref() {
                return Ok(conn.clone());
            }
        }

        let mut guard = self.connection.write().await;

        // Double-check: another task may have connected while we waited.
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await?;
        *guard = Some(conn.clone());
        tracing::debug!("redis connection established");

        Ok(conn)
    }

    /// Drop the cached connection after a command failure.
    async fn reset_connection(&self) {
        let mut guard = self.connection.write().await;
        *guard = None;
        tracing::debug!("redis connection reset after error");
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn exists(&self, key: &str) -> anyhow::Result<bool> {
        let mut conn = self.get_connection().await?;
        match conn.exists::<_, bool>(key).await {
            Ok(found) => Ok(found),
            Err(e) => {
                self.reset_connection().await;
                Err(e.into())
            }
        }
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        let mut conn = self.get_connection().await?;
        match conn.get::<_, Option<Vec<u8>>>(key).await {
            Ok(value) => Ok(value.map(Bytes::from)),
            Err(e) => {
                self.reset_connection().await;
                Err(e.into())
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> anyhow::Result<()> {
        let mut conn = self.get_connection().await?;
        let result = match ttl {
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                    .await
            }
            None => conn.set::<_, _, ()>(key, value).await,
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                self.reset_connection().await;
                Err(e.into())
            }
        }
    }
}
