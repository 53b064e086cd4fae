//! Reqwest Remote Fetcher
//!
//! Implements RemoteFetcher using a shared reqwest client with a
//! client-level request timeout, so every remote call the core makes is
//! time-bounded.

use crate::domain::ports::{FetchResponse, RemoteFetcher};
use async_trait::async_trait;
use std::time::Duration;

/// HTTP fetcher backed by reqwest.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> anyhow::Result<FetchResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(FetchResponse { status, body })
    }
}
