//! Remote Fetcher Port
//!
//! Defines the interface for timed-out HTTP retrievals of remote resources:
//! the geolocation fallback service and the reference-data sources.

use async_trait::async_trait;
use bytes::Bytes;

/// A completed remote retrieval: status code plus the full body.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Bytes,
}

impl FetchResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetcher for remote URLs.
///
/// This is an outbound port that abstracts the HTTP client. The production
/// implementation bounds every request with the configured timeout; a
/// timed-out or failed transfer is an `Err`, while a non-2xx response is a
/// successful fetch the caller inspects via `status`.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Perform a GET request against the given URL.
    async fn get(&self, url: &str) -> anyhow::Result<FetchResponse>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_is_success_bounds() {
        let ok = FetchResponse {
            status: 200,
            body: Bytes::new(),
        };
        assert!(ok.is_success());

        let created = FetchResponse {
            status: 201,
            body: Bytes::new(),
        };
        assert!(created.is_success());

        let redirect = FetchResponse {
            status: 301,
            body: Bytes::new(),
        };
        assert!(!redirect.is_success());

        let missing = FetchResponse {
            status: 404,
            body: Bytes::new(),
        };
        assert!(!missing.is_success());
    }
}
