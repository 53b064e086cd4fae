//! Integration tests for reference-data prefetch with Wiremock
//!
//! Verifies the concurrent population of the reference datasets: skip
//! semantics, canonical storage and partial-failure isolation.

use geo_enrich::adapters::outbound::{InMemoryKeyValueStore, ReqwestFetcher};
use geo_enrich::application::reference_data::{COUNTRIES_KEY, CURRENCIES_KEY};
use geo_enrich::application::{DatasetShape, DatasetSpec, PrefetchService};
use geo_enrich::domain::ports::{KeyValueStore, RemoteFetcher};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn datasets(server: &MockServer) -> Vec<DatasetSpec> {
    vec![
        DatasetSpec {
            key: COUNTRIES_KEY,
            url: format!("{}/countries", server.uri()),
            ttl: Duration::from_secs(3600),
            shape: DatasetShape::Sequence,
        },
        DatasetSpec {
            key: CURRENCIES_KEY,
            url: format!("{}/rates", server.uri()),
            ttl: Duration::from_secs(600),
            shape: DatasetShape::Object,
        },
    ]
}

fn prefetch(server: &MockServer, store: Arc<dyn KeyValueStore>) -> PrefetchService {
    let fetcher: Arc<dyn RemoteFetcher> =
        Arc::new(ReqwestFetcher::new(Duration::from_secs(5)).unwrap());
    PrefetchService::new(store, fetcher, datasets(server))
}

#[tokio::test]
async fn test_populates_both_datasets_concurrently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"cca2": "US"}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rates": {"USD": 1.0}})))
        .expect(1)
        .mount(&server)
        .await;

    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
    prefetch(&server, store.clone()).pre_fetch_data().await.unwrap();

    assert!(store.exists(COUNTRIES_KEY).await.unwrap());
    assert!(store.exists(CURRENCIES_KEY).await.unwrap());
}

/// One dataset failing must not prevent the other from being durably
/// cached, and the error surfaces only after both finished.
#[tokio::test]
async fn test_partial_failure_isolation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"cca2": "US"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rates"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
    let err = prefetch(&server, store.clone())
        .pre_fetch_data()
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert!(store.exists(COUNTRIES_KEY).await.unwrap());
    assert!(!store.exists(CURRENCIES_KEY).await.unwrap());
}

/// Re-running the prefetch against a warm store fetches nothing.
#[tokio::test]
async fn test_idempotent_skip_when_present() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rates": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
    let service = prefetch(&server, store.clone());

    service.pre_fetch_data().await.unwrap();
    // Second run: both keys present, no further fetches (expect(1) above)
    service.pre_fetch_data().await.unwrap();
}

/// Stored blobs are the canonical re-encoding, not the raw upstream bytes.
#[tokio::test]
async fn test_stores_canonical_encoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/countries"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("[ {\"cca2\" :\n\"US\"} ]", "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rates"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("{ \"rates\" : { \"USD\" : 1.0 } }", "application/json"),
        )
        .mount(&server)
        .await;

    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
    prefetch(&server, store.clone()).pre_fetch_data().await.unwrap();

    let countries = store.get(COUNTRIES_KEY).await.unwrap().unwrap();
    assert_eq!(&countries[..], br#"[{"cca2":"US"}]"#);

    let rates = store.get(CURRENCIES_KEY).await.unwrap().unwrap();
    assert_eq!(&rates[..], br#"{"rates":{"USD":1.0}}"#);
}

/// A dataset whose body does not match its declared shape fails with a
/// decode error without touching the sibling.
#[tokio::test]
async fn test_shape_mismatch_fails_that_dataset_only() {
    let server = MockServer::start().await;
    // countries must be a sequence; an object is a decode failure
    Mock::given(method("GET"))
        .and(path("/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cca2": "US"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rates": {"USD": 1.0}})))
        .mount(&server)
        .await;

    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
    let err = prefetch(&server, store.clone())
        .pre_fetch_data()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        geo_enrich::EnrichError::Decode { .. }
    ));
    assert!(!store.exists(COUNTRIES_KEY).await.unwrap());
    assert!(store.exists(CURRENCIES_KEY).await.unwrap());
}
