//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

/// Mean Earth radius in kilometers, used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic coordinate (latitude/longitude in degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a point from a `[lat, lng]` slice as found in the countries
    /// dataset. Returns None when the slice holds fewer than two values.
    pub fn from_lat_lng(lat_lng: &[f64]) -> Option<Self> {
        if lat_lng.len() < 2 {
            return None;
        }
        Some(Self::new(lat_lng[0], lat_lng[1]))
    }

    /// Great-circle distance to another point in kilometers (haversine).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lon / 2.0).sin()
                * (d_lon / 2.0).sin();

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

/// A fixed UTC offset parsed from a `"UTC±HH:MM"` timezone string.
///
/// The parse rules mirror the countries dataset's timezone format: the
/// string must be at least 9 bytes, start with `UTC`, and carry an
/// `HH:MM` pair after the sign byte. Anything else is rejected, letting
/// callers skip malformed entries (a bare `"UTC"` is rejected too).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcOffset {
    minutes: i32,
}

impl UtcOffset {
    /// Parse a timezone string such as `"UTC-05:00"` or `"UTC+05:30"`.
    pub fn parse(timezone: &str) -> Option<Self> {
        let bytes = timezone.as_bytes();
        if bytes.len() < 9 || &bytes[..3] != b"UTC" {
            return None;
        }

        // The sign byte: '-' is negative, anything else counts as positive.
        let sign = if bytes[3] == b'-' { -1 } else { 1 };
        if !timezone.is_char_boundary(4) {
            return None;
        }

        let (hours, minutes) = timezone[4..].split_once(':')?;
        let hours: i32 = hours.parse().ok()?;
        let minutes: i32 = minutes.parse().ok()?;

        Some(Self {
            minutes: sign * (hours * 60 + minutes),
        })
    }

    /// Total offset in whole minutes (negative for west of UTC).
    pub fn total_minutes(&self) -> i32 {
        self.minutes
    }

    /// The offset as a signed chrono duration, ready to add to a UTC time.
    pub fn to_chrono(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.minutes as i64)
    }
}
