//! Enrichment Service - Main application use case
//!
//! Turns an IP address into the enriched location record: resolve the
//! country, reuse the cached per-country record when one exists, otherwise
//! assemble it from the reference datasets, then persist it and feed the
//! distance statistics.

use crate::application::reference_data::ReferenceDataCache;
use crate::application::resolver::IpResolver;
use crate::application::stats::StatsRecorder;
use crate::domain::entities::IpLocationDetails;
use crate::domain::errors::EnrichError;
use crate::domain::ports::KeyValueStore;
use crate::domain::services::{LocalClock, RateConversion};
use crate::domain::value_objects::GeoPoint;
use chrono::Utc;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Key prefix of the per-country details cache.
pub const COUNTRY_DETAILS_PREFIX: &str = "country:";

/// The pivot currency every relative rate is computed against.
const PIVOT_CURRENCY: &str = "USD";

/// Enrichment service - main application use case.
///
/// Orchestrates one resolution:
/// 1. Resolve the IP to an ISO country code
/// 2. Serve from the per-country details cache when possible
/// 3. Otherwise assemble the record from the reference datasets
/// 4. Persist the record and record a distance sample
pub struct EnrichmentService {
    resolver: IpResolver,
    reference: ReferenceDataCache,
    store: Arc<dyn KeyValueStore>,
    stats: StatsRecorder,
    reference_point: GeoPoint,
    details_ttl: Duration,
}

impl EnrichmentService {
    pub fn new(
        resolver: IpResolver,
        reference: ReferenceDataCache,
        store: Arc<dyn KeyValueStore>,
        stats: StatsRecorder,
        reference_point: GeoPoint,
        details_ttl: Duration,
    ) -> Self {
        Self {
            resolver,
            reference,
            store,
            stats,
            reference_point,
            details_ttl,
        }
    }

    /// Resolve and enrich one IP address.
    ///
    /// A distance sample is recorded for every successful resolution,
    /// whether served from the cache or freshly computed.
    pub async fn get_ip_location_details(
        &self,
        ip: IpAddr,
    ) -> Result<IpLocationDetails, EnrichError> {
        let info = self.resolver.resolve(ip).await?;
        let cache_key = format!("{}{}", COUNTRY_DETAILS_PREFIX, info.iso_code);

        // Cache-aside short-circuit: only the point-in-time derived fields
        // are recomputed; the rest stays frozen until the entry expires.
        if let Some(mut details) = self.cached_details(&cache_key).await {
            LocalClock::refresh(&mut details.current_time_by_timezone, Utc::now());
            details.distance_to_reference_point =
                self.distance_from_reference(&details.lat_lng);

            self.stats.record(&details.country_name, &details.lat_lng);
            tracing::debug!("served {} from the details cache", info.iso_code);
            return Ok(details);
        }

        let country = self.reference.get_country(&info.iso_code).await?;
        let rates = self.reference.get_rates().await?;

        let usd_rate = *rates
            .rates
            .get(PIVOT_CURRENCY)
            .ok_or(EnrichError::UsdRateNotFound)?;

        let details = IpLocationDetails {
            country_name: country.name.common,
            cca2: country.cca2,
            relative_rates: RateConversion::relative_to_usd(
                &country.currencies,
                &rates.rates,
                usd_rate,
            ),
            current_time_by_timezone: LocalClock::by_timezone(&country.timezones, Utc::now()),
            distance_to_reference_point: self.distance_from_reference(&country.latlng),
            currencies: country.currencies,
            lat_lng: country.latlng,
        };

        let encoded = serde_json::to_vec(&details).map_err(|source| EnrichError::Decode {
            what: "location details",
            source,
        })?;
        self.store
            .set(&cache_key, &encoded, Some(self.details_ttl))
            .await
            .map_err(EnrichError::Store)?;

        self.stats.record(&details.country_name, &details.lat_lng);
        Ok(details)
    }

    /// Read a cached details record; undecodable entries and store failures
    /// read as a miss, forcing the cold path.
    async fn cached_details(&self, cache_key: &str) -> Option<IpLocationDetails> {
        match self.store.get(cache_key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(details) => Some(details),
                Err(e) => {
                    tracing::debug!("cached details at {} undecodable: {}", cache_key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("details cache read at {} failed: {:?}", cache_key, e);
                None
            }
        }
    }

    /// Distance between the fixed reference point and a `[lat, lng]` pair;
    /// 0 when the pair is unusable.
    fn distance_from_reference(&self, lat_lng: &[f64]) -> f64 {
        GeoPoint::from_lat_lng(lat_lng)
            .map(|point| self.reference_point.distance_km(&point))
            .unwrap_or(0.0)
    }
}
