//! Reference Data Cache - warm-cache read accessors
//!
//! Read-only access to the two reference datasets the prefetcher populates.
//! This layer never fetches: a missing or undecodable dataset is a
//! not-found error, keeping the request path strictly separated from the
//! startup population path.

use crate::domain::entities::{Country, RatesData};
use crate::domain::errors::EnrichError;
use crate::domain::ports::KeyValueStore;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Store key of the countries dataset.
pub const COUNTRIES_KEY: &str = "countries";
/// Store key of the currency-rates dataset.
pub const CURRENCIES_KEY: &str = "currencies";

/// Cache-aside reader for the countries and currency-rates datasets.
pub struct ReferenceDataCache {
    store: Arc<dyn KeyValueStore>,
}

impl ReferenceDataCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Find one country by its ISO 3166-1 alpha-2 code.
    pub async fn get_country(&self, iso_code: &str) -> Result<Country, EnrichError> {
        let countries: Vec<Country> = self.read_dataset(COUNTRIES_KEY).await?;

        countries
            .into_iter()
            .find(|country| country.cca2 == iso_code)
            .ok_or_else(|| EnrichError::CountryNotFound {
                iso_code: iso_code.to_string(),
            })
    }

    /// Read the current currency-rates snapshot.
    pub async fn get_rates(&self) -> Result<RatesData, EnrichError> {
        self.read_dataset(CURRENCIES_KEY).await
    }

    /// Read and decode one dataset blob. Store failures, absent keys and
    /// undecodable blobs all collapse to the dataset's not-found error;
    /// the non-absence causes are logged.
    async fn read_dataset<T: DeserializeOwned>(
        &self,
        key: &'static str,
    ) -> Result<T, EnrichError> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Err(EnrichError::DatasetNotFound { key }),
            Err(e) => {
                tracing::warn!("store read for dataset {} failed: {:?}", key, e);
                return Err(EnrichError::DatasetNotFound { key });
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!("dataset {} is undecodable: {}", key, e);
            EnrichError::DatasetNotFound { key }
        })
    }
}
