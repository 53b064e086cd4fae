//! Domain Errors
//!
//! One error type covers the whole enrichment path so inbound adapters can
//! map outcomes to user-visible classes: not-found (lookup misses), upstream
//! (remote dependency failures) and everything else.

use thiserror::Error;

/// Errors produced by the enrichment core.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Required configuration is absent. Fatal at startup only.
    #[error("missing required configuration: {0}")]
    NotConfigured(&'static str),

    /// Neither the local database nor the remote service knows this IP.
    #[error("IP location not found for IP: {ip}")]
    IpLocationNotFound { ip: String },

    /// The countries dataset has no entry for this ISO code.
    #[error("country code {iso_code} not found in cache")]
    CountryNotFound { iso_code: String },

    /// A reference dataset is absent from the cache (or undecodable).
    #[error("{key} data not found in cache")]
    DatasetNotFound { key: &'static str },

    /// The rates snapshot is missing its pivot currency.
    #[error("USD rate not found in cache")]
    UsdRateNotFound,

    /// A remote request failed at the transport level.
    #[error("error fetching {url}: {cause}")]
    Upstream { url: String, cause: anyhow::Error },

    /// A remote request completed with a non-success status.
    #[error("unexpected HTTP status {status} from {url}")]
    UpstreamStatus { url: String, status: u16 },

    /// A payload could not be decoded.
    #[error("error decoding {what}: {source}")]
    Decode {
        what: &'static str,
        source: serde_json::Error,
    },

    /// The key-value store failed.
    #[error("key-value store error: {0}")]
    Store(anyhow::Error),
}

impl EnrichError {
    /// Lookup-miss class: surfaced to callers as a 404 equivalent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::IpLocationNotFound { .. }
                | Self::CountryNotFound { .. }
                | Self::DatasetNotFound { .. }
                | Self::UsdRateNotFound
        )
    }

    /// Remote-dependency class: surfaced to callers as a 502 equivalent.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::UpstreamStatus { .. })
    }
}
