use crate::domain::errors::EnrichError;
use crate::domain::value_objects::GeoPoint;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // HTTP API
    pub api_listen_addr: String,

    // Key-value store; None falls back to the in-memory store
    pub redis_url: Option<String>,

    // Local offline geo database
    pub geoip_path: String,

    // Remote geolocation fallback, with an {ip} placeholder
    pub ipapi_url: String,

    // Reference datasets
    pub countries_url: String,
    pub countries_ttl_secs: u64,
    pub currencies_url: String,
    pub currencies_ttl_secs: u64,

    // Caching of computed records
    pub details_ttl_secs: u64,
    pub stats_ttl_secs: u64,

    // Outbound HTTP
    pub http_timeout_secs: u64,

    // Fixed reference point every distance is measured against
    pub reference_lat: f64,
    pub reference_lng: f64,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_listen_addr: "0.0.0.0:3000".to_string(),
            redis_url: None,
            geoip_path: "GeoLite2-City.mmdb".to_string(),
            ipapi_url: "https://ipapi.co/{ip}/json/".to_string(),
            countries_url:
                "https://restcountries.com/v3.1/all?fields=name,cca2,currencies,languages,latlng,timezones"
                    .to_string(),
            countries_ttl_secs: 7 * 24 * 3600,
            currencies_url: "https://open.er-api.com/v6/latest/USD".to_string(),
            currencies_ttl_secs: 24 * 3600,
            details_ttl_secs: 3600,
            stats_ttl_secs: 0,
            http_timeout_secs: 10,
            reference_lat: -34.6037,
            reference_lng: -58.3816,
            debug: false,
        }
    }
}

impl Config {
    /// Fail fast on configuration the core cannot run without: the
    /// remote URLs and a usable reference point. A (0, 0) reference point
    /// reads as unset.
    pub fn validate(&self) -> Result<(), EnrichError> {
        if self.ipapi_url.trim().is_empty() {
            return Err(EnrichError::NotConfigured(
                "remote IP lookup URL (GEOENRICH_IPAPI_URL)",
            ));
        }
        if self.countries_url.trim().is_empty() {
            return Err(EnrichError::NotConfigured(
                "countries dataset URL (GEOENRICH_COUNTRIES_URL)",
            ));
        }
        if self.currencies_url.trim().is_empty() {
            return Err(EnrichError::NotConfigured(
                "currencies dataset URL (GEOENRICH_CURRENCIES_URL)",
            ));
        }
        if self.reference_lat == 0.0 && self.reference_lng == 0.0 {
            return Err(EnrichError::NotConfigured(
                "reference point coordinates (GEOENRICH_REFERENCE_LAT/LNG)",
            ));
        }
        Ok(())
    }

    pub fn reference_point(&self) -> GeoPoint {
        GeoPoint::new(self.reference_lat, self.reference_lng)
    }

    pub fn countries_ttl(&self) -> Duration {
        Duration::from_secs(self.countries_ttl_secs)
    }

    pub fn currencies_ttl(&self) -> Duration {
        Duration::from_secs(self.currencies_ttl_secs)
    }

    pub fn details_ttl(&self) -> Duration {
        Duration::from_secs(self.details_ttl_secs)
    }

    /// TTL for the stats aggregate; 0 means the aggregate never expires.
    pub fn stats_ttl(&self) -> Option<Duration> {
        if self.stats_ttl_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.stats_ttl_secs))
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

pub fn load_config() -> anyhow::Result<Config> {
    let defaults = Config::default();

    let api_listen_addr = env_or("GEOENRICH_API_LISTEN_ADDR", &defaults.api_listen_addr);
    let redis_url = std::env::var("GEOENRICH_REDIS_URL").ok();
    let geoip_path = env_or("GEOENRICH_GEOIP_PATH", &defaults.geoip_path);
    let ipapi_url = env_or("GEOENRICH_IPAPI_URL", &defaults.ipapi_url);

    let countries_url = env_or("GEOENRICH_COUNTRIES_URL", &defaults.countries_url);
    let countries_ttl_secs =
        env_parse_or("GEOENRICH_COUNTRIES_TTL_SECS", defaults.countries_ttl_secs);
    let currencies_url = env_or("GEOENRICH_CURRENCIES_URL", &defaults.currencies_url);
    let currencies_ttl_secs =
        env_parse_or("GEOENRICH_CURRENCIES_TTL_SECS", defaults.currencies_ttl_secs);

    let details_ttl_secs = env_parse_or("GEOENRICH_DETAILS_TTL_SECS", defaults.details_ttl_secs);
    let stats_ttl_secs = env_parse_or("GEOENRICH_STATS_TTL_SECS", defaults.stats_ttl_secs);
    let http_timeout_secs = env_parse_or("GEOENRICH_HTTP_TIMEOUT_SECS", defaults.http_timeout_secs);

    let reference_lat = env_parse_or("GEOENRICH_REFERENCE_LAT", defaults.reference_lat);
    let reference_lng = env_parse_or("GEOENRICH_REFERENCE_LNG", defaults.reference_lng);

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        api_listen_addr,
        redis_url,
        geoip_path,
        ipapi_url,
        countries_url,
        countries_ttl_secs,
        currencies_url,
        currencies_ttl_secs,
        details_ttl_secs,
        stats_ttl_secs,
        http_timeout_secs,
        reference_lat,
        reference_lng,
        debug,
    })
}
