//! Distance Statistics Aggregator
//!
//! Maintains the running distance aggregate. All updates flow through a
//! single owner task fed by a channel, so the read-fold-write cycle on the
//! stored aggregate is serialized and concurrent resolutions cannot lose
//! updates to each other. Recording is fire-and-forget: aggregator
//! failures are logged and never surface to the request that produced the
//! sample.

use crate::domain::entities::{CountryDistance, DistanceStats};
use crate::domain::errors::EnrichError;
use crate::domain::ports::KeyValueStore;
use crate::domain::value_objects::GeoPoint;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Store key of the aggregate.
pub const DISTANCE_STATS_KEY: &str = "distance_stats";

/// One resolved request's contribution to the aggregate.
#[derive(Debug)]
struct Sample {
    country_name: String,
    lat_lng: Vec<f64>,
}

/// Cheap clonable handle for submitting samples to the aggregator task.
#[derive(Clone)]
pub struct StatsRecorder {
    tx: mpsc::UnboundedSender<Sample>,
}

impl StatsRecorder {
    /// Submit one sample. Never blocks and never fails the caller; if the
    /// aggregator task is gone the sample is dropped with a warning.
    pub fn record(&self, country_name: &str, lat_lng: &[f64]) {
        let sample = Sample {
            country_name: country_name.to_string(),
            lat_lng: lat_lng.to_vec(),
        };

        if self.tx.send(sample).is_err() {
            tracing::warn!("distance stats aggregator is gone, sample dropped");
        }
    }
}

/// Single-owner aggregator for the distance statistics.
pub struct DistanceStatsAggregator;

impl DistanceStatsAggregator {
    /// Spawn the aggregator task and return the recording handle.
    pub fn spawn(
        store: Arc<dyn KeyValueStore>,
        reference_point: GeoPoint,
        ttl: Option<Duration>,
    ) -> StatsRecorder {
        let (tx, mut rx) = mpsc::unbounded_channel::<Sample>();

        tokio::spawn(async move {
            while let Some(sample) = rx.recv().await {
                if let Err(e) = Self::apply(&store, reference_point, ttl, sample).await {
                    tracing::error!("failed to record distance sample: {}", e);
                }
            }
            tracing::debug!("distance stats aggregator stopped");
        });

        StatsRecorder { tx }
    }

    /// Fold one sample into the stored aggregate.
    async fn apply(
        store: &Arc<dyn KeyValueStore>,
        reference_point: GeoPoint,
        ttl: Option<Duration>,
        sample: Sample,
    ) -> Result<(), EnrichError> {
        let Some(point) = GeoPoint::from_lat_lng(&sample.lat_lng) else {
            tracing::warn!(
                "sample for {} has no usable coordinates, skipping",
                sample.country_name
            );
            return Ok(());
        };

        let distance = reference_point.distance_km(&point);

        // An unreadable aggregate (absent or undecodable) starts fresh.
        let current = Self::load(store.as_ref()).await.ok();
        let updated = Self::fold_sample(current, &sample.country_name, distance);

        let encoded = serde_json::to_vec(&updated).map_err(|source| EnrichError::Decode {
            what: "distance stats",
            source,
        })?;
        store
            .set(DISTANCE_STATS_KEY, &encoded, ttl)
            .await
            .map_err(EnrichError::Store)?;

        tracing::debug!(
            "recorded sample for {} at {:.1} km ({} total requests)",
            sample.country_name,
            distance,
            updated.total_requests
        );
        Ok(())
    }

    /// Pure fold of one sample into an aggregate.
    ///
    /// A stored closest distance of exactly 0.0 is treated as "unset" and
    /// overwritten by the next sample, so a genuinely-zero closest sample
    /// is indistinguishable from no data. This reproduces the observed
    /// behavior of the system this one replaces.
    pub fn fold_sample(
        current: Option<DistanceStats>,
        country_name: &str,
        distance: f64,
    ) -> DistanceStats {
        let mut stats = match current {
            None => DistanceStats {
                farthest_distance: distance,
                farthest_country: country_name.to_string(),
                closest_distance: distance,
                closest_country: country_name.to_string(),
                total_distance: distance,
                total_requests: 1,
                ..Default::default()
            },
            Some(mut stats) => {
                stats.total_requests += 1;
                stats.total_distance += distance;

                if distance > stats.farthest_distance {
                    stats.farthest_distance = distance;
                    stats.farthest_country = country_name.to_string();
                }
                if distance < stats.closest_distance || stats.closest_distance == 0.0 {
                    stats.closest_distance = distance;
                    stats.closest_country = country_name.to_string();
                }

                stats
            }
        };

        let bucket = stats
            .country_distances
            .entry(country_name.to_string())
            .or_insert_with(CountryDistance::default);
        bucket.total_distance += distance;
        bucket.requests += 1;

        stats
    }

    /// Read the current aggregate from the store.
    pub async fn load(store: &dyn KeyValueStore) -> Result<DistanceStats, EnrichError> {
        let bytes = match store.get(DISTANCE_STATS_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                return Err(EnrichError::DatasetNotFound {
                    key: DISTANCE_STATS_KEY,
                })
            }
            Err(e) => return Err(EnrichError::Store(e)),
        };

        serde_json::from_slice(&bytes).map_err(|source| EnrichError::Decode {
            what: "distance stats",
            source,
        })
    }

    /// Average distance over all recorded requests; 0 when empty.
    pub fn weighted_average_distance(stats: &DistanceStats) -> f64 {
        if stats.total_requests == 0 {
            return 0.0;
        }
        stats.total_distance / stats.total_requests as f64
    }
}
