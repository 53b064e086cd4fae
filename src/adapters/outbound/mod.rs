mod http_fetcher;
mod maxmind_geo;
mod memory_store;
mod redis_store;

pub use http_fetcher::ReqwestFetcher;
pub use maxmind_geo::MaxmindGeoDatabase;
pub use memory_store::InMemoryKeyValueStore;
pub use redis_store::RedisKeyValueStore;
