//! Prefetch Service - startup population of the reference datasets
//!
//! Fetches each configured dataset concurrently and stores the canonical
//! JSON encoding in the key-value store. Datasets already present are
//! skipped; a failing dataset never cancels or delays its siblings.

use crate::domain::errors::EnrichError;
use crate::domain::ports::{KeyValueStore, RemoteFetcher};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// How a dataset's response body is shaped on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetShape {
    /// A JSON sequence of records (the countries dataset)
    Sequence,
    /// A single JSON object (the currency-rates dataset)
    Object,
}

/// One dataset to prefetch: where it lives remotely, where it is stored,
/// and how long the stored copy lives.
#[derive(Debug, Clone)]
pub struct DatasetSpec {
    pub key: &'static str,
    pub url: String,
    pub ttl: Duration,
    pub shape: DatasetShape,
}

/// Concurrent prefetcher for the reference datasets.
///
/// Safe to call on every startup: datasets already present in the store are
/// left untouched (no re-fetch, no TTL refresh).
pub struct PrefetchService {
    store: Arc<dyn KeyValueStore>,
    fetcher: Arc<dyn RemoteFetcher>,
    datasets: Vec<DatasetSpec>,
}

impl PrefetchService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        fetcher: Arc<dyn RemoteFetcher>,
        datasets: Vec<DatasetSpec>,
    ) -> Self {
        Self {
            store,
            fetcher,
            datasets,
        }
    }

    /// Populate every configured dataset, one concurrent task per dataset.
    ///
    /// Waits for all tasks regardless of individual failures and returns
    /// the first collected error, if any, only after the whole fan-in - a
    /// slow or failing dataset must not keep a successful sibling from
    /// being durably cached.
    pub async fn pre_fetch_data(&self) -> Result<(), EnrichError> {
        let mut tasks = JoinSet::new();

        for dataset in &self.datasets {
            let store = self.store.clone();
            let fetcher = self.fetcher.clone();
            let dataset = dataset.clone();

            tasks.spawn(async move { Self::populate(store, fetcher, dataset).await });
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("prefetch task panicked: {}", e);
                    Err(EnrichError::Store(anyhow::anyhow!(
                        "prefetch task panicked: {e}"
                    )))
                }
            };

            if let Err(e) = result {
                tracing::error!("prefetch failed: {}", e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    /// Fetch one dataset and store its canonical encoding.
    async fn populate(
        store: Arc<dyn KeyValueStore>,
        fetcher: Arc<dyn RemoteFetcher>,
        dataset: DatasetSpec,
    ) -> Result<(), EnrichError> {
        if store.exists(dataset.key).await.map_err(EnrichError::Store)? {
            tracing::debug!("dataset {} already cached, skipping", dataset.key);
            return Ok(());
        }

        let response = fetcher
            .get(&dataset.url)
            .await
            .map_err(|cause| EnrichError::Upstream {
                url: dataset.url.clone(),
                cause,
            })?;

        if !response.is_success() {
            return Err(EnrichError::UpstreamStatus {
                url: dataset.url.clone(),
                status: response.status,
            });
        }

        // Decode against the expected shape, then re-encode so the stored
        // blob is the canonical representation regardless of upstream
        // formatting.
        let canonical = match dataset.shape {
            DatasetShape::Sequence => {
                let records: Vec<serde_json::Value> = serde_json::from_slice(&response.body)
                    .map_err(|source| EnrichError::Decode {
                        what: dataset.key,
                        source,
                    })?;
                serde_json::to_vec(&records)
            }
            DatasetShape::Object => {
                let record: serde_json::Map<String, serde_json::Value> =
                    serde_json::from_slice(&response.body).map_err(|source| {
                        EnrichError::Decode {
                            what: dataset.key,
                            source,
                        }
                    })?;
                serde_json::to_vec(&record)
            }
        }
        .map_err(|source| EnrichError::Decode {
            what: dataset.key,
            source,
        })?;

        store
            .set(dataset.key, &canonical, Some(dataset.ttl))
            .await
            .map_err(EnrichError::Store)?;

        tracing::info!(
            "prefetched dataset {} ({} bytes, ttl {:?})",
            dataset.key,
            canonical.len(),
            dataset.ttl
        );
        Ok(())
    }
}
