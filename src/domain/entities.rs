//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the geo-enrich domain:
//! the reference datasets (countries, currency rates), the resolver output,
//! the enriched per-IP record and the running distance aggregate.
//! They have no external dependencies beyond serde.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One country from the "countries" reference dataset.
///
/// Field names follow the canonical stored representation of the dataset
/// (the shape the remote countries service produces), so the blob cached in
/// the key-value store decodes directly into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code; the implicit key of the dataset
    pub cca2: String,
    /// Currencies held by this country, keyed by currency code
    #[serde(default)]
    pub currencies: HashMap<String, Currency>,
    /// Spoken languages, keyed by language code
    #[serde(default)]
    pub languages: HashMap<String, String>,
    /// Latitude/longitude pair; may be absent or short in the upstream data
    #[serde(default)]
    pub latlng: Vec<f64>,
    pub name: CountryName,
    /// Timezones as "UTC±HH:MM" strings
    #[serde(default)]
    pub timezones: Vec<String>,
}

/// A currency as described by the countries dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

/// Naming information for a country.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryName {
    #[serde(default)]
    pub common: String,
    #[serde(default)]
    pub official: String,
    #[serde(default, rename = "nativeName")]
    pub native_name: HashMap<String, NativeName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeName {
    #[serde(default)]
    pub common: String,
    #[serde(default)]
    pub official: String,
}

/// Snapshot of the "currencies" reference dataset.
///
/// Must contain a "USD" entry - it is the pivot every relative rate is
/// computed against. Refreshed only by re-prefetching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatesData {
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

/// Resolver output: which country an IP belongs to. Transient, not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryInfo {
    pub name: String,
    pub iso_code: String,
}

/// The enriched per-IP record, cached per country.
///
/// Cached at `"country:" + iso_code` with a configured TTL. On a cache hit
/// only `current_time_by_timezone` and `distance_to_reference_point` are
/// recomputed; every other field stays frozen until the entry expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLocationDetails {
    pub country_name: String,
    pub cca2: String,
    pub currencies: HashMap<String, Currency>,
    /// Each held currency's rate divided by the USD rate
    pub relative_rates: HashMap<String, f64>,
    /// Formatted wall-clock time per "UTC±HH:MM" timezone
    pub current_time_by_timezone: HashMap<String, String>,
    pub lat_lng: Vec<f64>,
    pub distance_to_reference_point: f64,
}

/// Running aggregate of distances between resolved countries and the fixed
/// reference point. Single process-wide record at the `"distance_stats"` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceStats {
    pub farthest_distance: f64,
    pub farthest_country: String,
    /// A closest distance of exactly 0.0 doubles as "unset"
    pub closest_distance: f64,
    pub closest_country: String,
    pub total_distance: f64,
    pub total_requests: u64,
    #[serde(default)]
    pub country_distances: HashMap<String, CountryDistance>,
}

/// Per-country bucket of the distance aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryDistance {
    pub total_distance: f64,
    pub requests: u64,
}
