//! MaxMind Geo Database
//!
//! Implements GeoDatabase using a MaxMind GeoLite2 database file
//! (the City and Country editions both carry the country section read here).

use crate::domain::ports::{GeoCountryRecord, GeoDatabase};
use maxminddb::Reader;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;

/// MaxMind-backed local geo database.
pub struct MaxmindGeoDatabase {
    reader: Reader<Vec<u8>>,
}

impl MaxmindGeoDatabase {
    /// Load a GeoLite2 database from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self { reader })
    }
}

impl GeoDatabase for MaxmindGeoDatabase {
    fn lookup(&self, ip: IpAddr) -> Option<GeoCountryRecord> {
        #[derive(Debug, Deserialize)]
        struct Country {
            iso_code: Option<String>,
            names: Option<HashMap<String, String>>,
        }

        #[derive(Debug, Deserialize)]
        struct CountryResp {
            country: Option<Country>,
        }

        let resp: CountryResp = match self.reader.lookup(ip) {
            Ok(resp) => resp,
            Err(e) => {
                // Address-not-found and database errors both mean "no
                // local answer"; the caller falls back to the remote service.
                tracing::debug!("local geo lookup for {} yielded nothing: {}", ip, e);
                return None;
            }
        };

        let country = resp.country?;
        let iso_code = country.iso_code?;
        let name = country
            .names
            .and_then(|names| names.get("en").cloned())
            .unwrap_or_default();

        Some(GeoCountryRecord { iso_code, name })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_file_nonexistent() {
        let result = MaxmindGeoDatabase::from_file("/nonexistent/path/GeoLite2.mmdb");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not an mmdb file").unwrap();

        let result = MaxmindGeoDatabase::from_file(file.path());
        assert!(result.is_err());
    }
}
