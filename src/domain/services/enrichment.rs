//! Enrichment Rules
//!
//! Pure domain logic for deriving the enriched fields of a location record.
//! These services have NO external dependencies beyond chrono - no I/O.

use crate::domain::entities::Currency;
use crate::domain::value_objects::UtcOffset;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Wall-clock format for per-timezone times (RFC 1123 with a UTC zone name,
/// matching the persisted record format).
const CLOCK_FORMAT: &str = "%a, %d %b %Y %H:%M:%S UTC";

/// Conversion of raw exchange rates into USD-relative rates.
pub struct RateConversion;

impl RateConversion {
    /// Divide each held currency's rate by the USD pivot rate.
    ///
    /// Only currencies present in both the country's currency set and the
    /// rates snapshot are included; codes absent from the snapshot are
    /// omitted, never zero-filled.
    pub fn relative_to_usd(
        currencies: &HashMap<String, Currency>,
        rates: &HashMap<String, f64>,
        usd_rate: f64,
    ) -> HashMap<String, f64> {
        let mut relative = HashMap::new();
        for code in currencies.keys() {
            if let Some(rate) = rates.get(code) {
                relative.insert(code.clone(), rate / usd_rate);
            }
        }
        relative
    }
}

/// Per-timezone wall clocks derived from "UTC±HH:MM" strings.
pub struct LocalClock;

impl LocalClock {
    /// Compute the current wall-clock time for each timezone.
    ///
    /// Malformed timezone strings are skipped - they are omitted from the
    /// map rather than producing an error.
    pub fn by_timezone(timezones: &[String], now: DateTime<Utc>) -> HashMap<String, String> {
        let mut times = HashMap::new();
        for timezone in timezones {
            if let Some(offset) = UtcOffset::parse(timezone) {
                times.insert(timezone.clone(), Self::format(now, offset));
            }
        }
        times
    }

    /// Refresh the values of an already-computed map in place.
    ///
    /// Iterates the map's existing keys (not the country's timezone list);
    /// entries whose key no longer parses keep their stale value.
    pub fn refresh(times: &mut HashMap<String, String>, now: DateTime<Utc>) {
        for (timezone, formatted) in times.iter_mut() {
            if let Some(offset) = UtcOffset::parse(timezone) {
                *formatted = Self::format(now, offset);
            }
        }
    }

    fn format(now: DateTime<Utc>, offset: UtcOffset) -> String {
        (now + offset.to_chrono()).format(CLOCK_FORMAT).to_string()
    }
}
