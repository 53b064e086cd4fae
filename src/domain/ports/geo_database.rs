//! Geo Database Port
//!
//! Defines the interface for the local offline IP-to-country database.

use std::net::IpAddr;

/// A country record from the local database.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCountryRecord {
    /// ISO 3166-1 alpha-2 code; may be empty when the database has no code
    pub iso_code: String,
    /// Localized (English) country name; may be empty
    pub name: String,
}

/// Resolver for IP address to country over a local offline database.
///
/// This is an outbound port that abstracts the GeoIP database.
/// Implementations may use MaxMind GeoLite2 or other databases. Lookup
/// failures are logged by the adapter and collapse to None - callers treat
/// "no record" and "database error" the same way: fall back to the remote
/// lookup service.
pub trait GeoDatabase: Send + Sync {
    /// Look up the country for an IP, or None when the database has no
    /// record for it.
    fn lookup(&self, ip: IpAddr) -> Option<GeoCountryRecord>;
}
