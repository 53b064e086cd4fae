//! Application Layer
//!
//! Use cases composed from domain ports: IP resolution, reference-data
//! access, startup prefetch, enrichment and the distance-statistics
//! aggregator.

pub mod enrichment;
pub mod prefetch;
pub mod reference_data;
pub mod resolver;
pub mod stats;

pub use enrichment::EnrichmentService;
pub use prefetch::{DatasetShape, DatasetSpec, PrefetchService};
pub use reference_data::ReferenceDataCache;
pub use resolver::IpResolver;
pub use stats::{DistanceStatsAggregator, StatsRecorder};
