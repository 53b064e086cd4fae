//! geo-enrich Library
//!
//! This module exposes the geo-enrich components for use in integration
//! tests and as a library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{
    DatasetShape, DatasetSpec, DistanceStatsAggregator, EnrichmentService, IpResolver,
    PrefetchService, ReferenceDataCache, StatsRecorder,
};
pub use config::load_config;
pub use domain::entities::{Country, DistanceStats, IpLocationDetails, RatesData};
pub use domain::errors::EnrichError;
pub use domain::ports::{GeoDatabase, KeyValueStore, RemoteFetcher};
pub use domain::value_objects::GeoPoint;
