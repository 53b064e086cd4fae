//! IP Resolver - local-first country resolution
//!
//! Resolves an IP address to a country, preferring the local offline geo
//! database and falling back to the remote geolocation service.

use crate::domain::entities::CountryInfo;
use crate::domain::errors::EnrichError;
use crate::domain::ports::{GeoDatabase, RemoteFetcher};
use serde::Deserialize;
use std::net::IpAddr;
use std::sync::Arc;

/// Response shape of the remote geolocation service.
#[derive(Debug, Deserialize)]
struct ExternalApiResponse {
    #[serde(default)]
    country_name: String,
    #[serde(default)]
    country_code: String,
}

/// Resolver for IP address to country.
///
/// The local database wins unconditionally when it has a record with a
/// non-empty ISO code; everything else (no local database, no record,
/// lookup failure) falls back to exactly one remote fetch. No retries.
pub struct IpResolver {
    geo_db: Option<Arc<dyn GeoDatabase>>,
    fetcher: Arc<dyn RemoteFetcher>,
    /// URL template with an `{ip}` placeholder
    api_url: String,
}

impl IpResolver {
    /// Create a resolver. Fails when the remote URL template is empty -
    /// the fallback service is required configuration.
    pub fn new(
        geo_db: Option<Arc<dyn GeoDatabase>>,
        fetcher: Arc<dyn RemoteFetcher>,
        api_url: String,
    ) -> Result<Self, EnrichError> {
        if api_url.trim().is_empty() {
            return Err(EnrichError::NotConfigured("remote IP lookup URL"));
        }

        Ok(Self {
            geo_db,
            fetcher,
            api_url,
        })
    }

    /// Resolve an IP address to a country.
    pub async fn resolve(&self, ip: IpAddr) -> Result<CountryInfo, EnrichError> {
        if let Some(db) = &self.geo_db {
            if let Some(record) = db.lookup(ip) {
                if !record.iso_code.is_empty() {
                    tracing::debug!("resolved {} locally as {}", ip, record.iso_code);
                    return Ok(CountryInfo {
                        name: record.name,
                        iso_code: record.iso_code,
                    });
                }
            }
        }

        self.fetch_from_api(ip).await
    }

    async fn fetch_from_api(&self, ip: IpAddr) -> Result<CountryInfo, EnrichError> {
        let url = self.api_url.replace("{ip}", &ip.to_string());

        let response = self
            .fetcher
            .get(&url)
            .await
            .map_err(|cause| EnrichError::Upstream {
                url: url.clone(),
                cause,
            })?;

        if !response.is_success() {
            return Err(EnrichError::UpstreamStatus {
                url,
                status: response.status,
            });
        }

        let api: ExternalApiResponse =
            serde_json::from_slice(&response.body).map_err(|source| EnrichError::Decode {
                what: "IP lookup response",
                source,
            })?;

        if api.country_name.is_empty() || api.country_code.is_empty() {
            return Err(EnrichError::IpLocationNotFound { ip: ip.to_string() });
        }

        tracing::debug!("resolved {} remotely as {}", ip, api.country_code);
        Ok(CountryInfo {
            name: api.country_name,
            iso_code: api.country_code,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::ports::{FetchResponse, GeoCountryRecord};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticGeoDb(Option<GeoCountryRecord>);

    impl GeoDatabase for StaticGeoDb {
        fn lookup(&self, _ip: IpAddr) -> Option<GeoCountryRecord> {
            self.0.clone()
        }
    }

    struct ScriptedFetcher {
        calls: AtomicUsize,
        status: u16,
        body: &'static str,
    }

    impl ScriptedFetcher {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                status,
                body,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RemoteFetcher for ScriptedFetcher {
        async fn get(&self, _url: &str) -> anyhow::Result<FetchResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchResponse {
                status: self.status,
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }

    fn ip() -> IpAddr {
        "8.8.8.8".parse().unwrap()
    }

    #[test]
    fn test_new_requires_api_url() {
        let fetcher = Arc::new(ScriptedFetcher::new(200, "{}"));
        let result = IpResolver::new(None, fetcher, "  ".to_string());
        assert!(matches!(result, Err(EnrichError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_local_hit_never_calls_remote() {
        let fetcher = Arc::new(ScriptedFetcher::new(200, "{}"));
        let geo_db = Arc::new(StaticGeoDb(Some(GeoCountryRecord {
            iso_code: "US".to_string(),
            name: "United States".to_string(),
        })));

        let resolver = IpResolver::new(
            Some(geo_db),
            fetcher.clone(),
            "http://geo.test/{ip}".to_string(),
        )
        .unwrap();

        let info = resolver.resolve(ip()).await.unwrap();
        assert_eq!(info.iso_code, "US");
        assert_eq!(info.name, "United States");
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_local_iso_code_falls_back() {
        let fetcher = Arc::new(ScriptedFetcher::new(
            200,
            r#"{"country_name": "Argentina", "country_code": "AR"}"#,
        ));
        let geo_db = Arc::new(StaticGeoDb(Some(GeoCountryRecord {
            iso_code: String::new(),
            name: "somewhere".to_string(),
        })));

        let resolver = IpResolver::new(
            Some(geo_db),
            fetcher.clone(),
            "http://geo.test/{ip}".to_string(),
        )
        .unwrap();

        let info = resolver.resolve(ip()).await.unwrap();
        assert_eq!(info.iso_code, "AR");
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_local_miss_calls_remote_exactly_once() {
        let fetcher = Arc::new(ScriptedFetcher::new(
            200,
            r#"{"country_name": "Argentina", "country_code": "AR"}"#,
        ));
        let geo_db = Arc::new(StaticGeoDb(None));

        let resolver = IpResolver::new(
            Some(geo_db),
            fetcher.clone(),
            "http://geo.test/{ip}".to_string(),
        )
        .unwrap();

        let info = resolver.resolve(ip()).await.unwrap();
        assert_eq!(info.iso_code, "AR");
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_local_database_goes_remote() {
        let fetcher = Arc::new(ScriptedFetcher::new(
            200,
            r#"{"country_name": "Brazil", "country_code": "BR"}"#,
        ));

        let resolver =
            IpResolver::new(None, fetcher.clone(), "http://geo.test/{ip}".to_string()).unwrap();

        let info = resolver.resolve(ip()).await.unwrap();
        assert_eq!(info.iso_code, "BR");
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_remote_empty_fields_is_not_found() {
        for body in [
            r#"{"country_name": "", "country_code": "AR"}"#,
            r#"{"country_name": "Argentina", "country_code": ""}"#,
            r#"{}"#,
        ] {
            let fetcher = Arc::new(ScriptedFetcher {
                calls: AtomicUsize::new(0),
                status: 200,
                body,
            });
            let resolver =
                IpResolver::new(None, fetcher, "http://geo.test/{ip}".to_string()).unwrap();

            let err = resolver.resolve(ip()).await.unwrap_err();
            assert!(
                matches!(err, EnrichError::IpLocationNotFound { .. }),
                "body {body} should be not-found, got {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_remote_error_status_surfaces() {
        let fetcher = Arc::new(ScriptedFetcher::new(500, ""));
        let resolver = IpResolver::new(None, fetcher, "http://geo.test/{ip}".to_string()).unwrap();

        let err = resolver.resolve(ip()).await.unwrap_err();
        assert!(matches!(
            err,
            EnrichError::UpstreamStatus { status: 500, .. }
        ));
    }

    #[tokio::test]
    async fn test_remote_malformed_body_is_decode_error() {
        let fetcher = Arc::new(ScriptedFetcher::new(200, "not json"));
        let resolver = IpResolver::new(None, fetcher, "http://geo.test/{ip}".to_string()).unwrap();

        let err = resolver.resolve(ip()).await.unwrap_err();
        assert!(matches!(err, EnrichError::Decode { .. }));
    }
}
