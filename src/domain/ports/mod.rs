mod geo_database;
mod key_value_store;
mod remote_fetcher;

pub use geo_database::{GeoCountryRecord, GeoDatabase};
pub use key_value_store::KeyValueStore;
pub use remote_fetcher::{FetchResponse, RemoteFetcher};
