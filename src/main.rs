//! geo-enrich - IP enrichment service with hexagonal architecture
//!
//! This is the composition root that wires together all the components.

use geo_enrich::adapters::inbound::ApiServer;
use geo_enrich::adapters::outbound::{
    InMemoryKeyValueStore, MaxmindGeoDatabase, RedisKeyValueStore, ReqwestFetcher,
};
use geo_enrich::application::reference_data::{COUNTRIES_KEY, CURRENCIES_KEY};
use geo_enrich::application::{
    DatasetShape, DatasetSpec, DistanceStatsAggregator, EnrichmentService, IpResolver,
    PrefetchService, ReferenceDataCache,
};
use geo_enrich::config::load_config;
use geo_enrich::domain::ports::{GeoDatabase, KeyValueStore, RemoteFetcher};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;
    cfg.validate()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting geo-enrich listen={} reference=({}, {})",
        cfg.api_listen_addr,
        cfg.reference_lat,
        cfg.reference_lng
    );

    // ===== COMPOSITION ROOT =====
    // Wire up all adapters and services

    // 1. Create outbound adapters

    // Key-value store (Redis, or in-memory when unconfigured)
    let store: Arc<dyn KeyValueStore> = match &cfg.redis_url {
        Some(url) => {
            tracing::info!("using redis key-value store at {}", url);
            Arc::new(RedisKeyValueStore::new(url)?)
        }
        None => {
            tracing::warn!("GEOENRICH_REDIS_URL not set, using in-memory store (non-persistent)");
            Arc::new(InMemoryKeyValueStore::new())
        }
    };

    // Remote fetcher (reqwest, request-timeout bound)
    let fetcher: Arc<dyn RemoteFetcher> = Arc::new(ReqwestFetcher::new(cfg.http_timeout())?);

    // Local geo database (MaxMind); missing file degrades to remote-only
    let geo_db: Option<Arc<dyn GeoDatabase>> = match MaxmindGeoDatabase::from_file(&cfg.geoip_path)
    {
        Ok(db) => {
            tracing::info!("GeoIP DB loaded from {}", cfg.geoip_path);
            Some(Arc::new(db) as Arc<dyn GeoDatabase>)
        }
        Err(e) => {
            tracing::error!(
                "failed to load GeoIP DB from {}: {:?}; resolving via remote lookups only",
                cfg.geoip_path,
                e
            );
            None
        }
    };

    // 2. Warm the reference-data cache. A prefetch failure is not fatal:
    // affected lookups surface not-found errors until the data arrives.
    let prefetch = PrefetchService::new(
        store.clone(),
        fetcher.clone(),
        vec![
            DatasetSpec {
                key: COUNTRIES_KEY,
                url: cfg.countries_url.clone(),
                ttl: cfg.countries_ttl(),
                shape: DatasetShape::Sequence,
            },
            DatasetSpec {
                key: CURRENCIES_KEY,
                url: cfg.currencies_url.clone(),
                ttl: cfg.currencies_ttl(),
                shape: DatasetShape::Object,
            },
        ],
    );
    if let Err(e) = prefetch.pre_fetch_data().await {
        tracing::error!("reference data prefetch incomplete: {}", e);
    }

    // 3. Create application services
    let stats =
        DistanceStatsAggregator::spawn(store.clone(), cfg.reference_point(), cfg.stats_ttl());

    let resolver = IpResolver::new(geo_db, fetcher, cfg.ipapi_url.clone())?;

    let service = Arc::new(EnrichmentService::new(
        resolver,
        ReferenceDataCache::new(store.clone()),
        store.clone(),
        stats,
        cfg.reference_point(),
        cfg.details_ttl(),
    ));

    // 4. Create inbound adapter and run
    let server = ApiServer::new(service, store);
    server.run(&cfg.api_listen_addr).await
}
