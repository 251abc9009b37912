//! Timezone resolution for site-local sampling times
//!
//! Profiles are sampled at local midnight and local noon, so each (site,
//! date, hour) triple must be converted to a UTC timestamp before the raw
//! filename can be derived. The default resolver maps coordinates to an
//! IANA timezone with `tzf-rs` and localizes with `chrono-tz`; a fixed-UTC
//! resolver is provided for tests and prime-meridian sites.

use crate::{Error, Result};
use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use tzf_rs::DefaultFinder;

/// Seam converting a site-local wall-clock time to UTC seconds
pub trait TimezoneResolver {
    /// Resolve a naive local date-time at the given coordinates to a UTC
    /// unix timestamp in seconds
    fn utc_seconds(&self, latitude: f64, longitude: f64, local: NaiveDateTime) -> Result<i64>;
}

/// Resolver backed by an embedded timezone boundary database
pub struct CoordinateTimezoneResolver {
    finder: DefaultFinder,
}

impl CoordinateTimezoneResolver {
    /// Create a resolver; loads the embedded boundary data once
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }
}

impl Default for CoordinateTimezoneResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CoordinateTimezoneResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinateTimezoneResolver").finish()
    }
}

impl TimezoneResolver for CoordinateTimezoneResolver {
    fn utc_seconds(&self, latitude: f64, longitude: f64, local: NaiveDateTime) -> Result<i64> {
        let name = self.finder.get_tz_name(longitude, latitude);
        if name.is_empty() {
            return Err(Error::timezone(format!(
                "no timezone found for coordinates ({}, {})",
                latitude, longitude
            )));
        }

        let zone: Tz = name
            .parse()
            .map_err(|_| Error::timezone(format!("unknown timezone name '{}'", name)))?;

        // DST transitions make some local times ambiguous or nonexistent;
        // resolve to the earliest valid instant
        let localized = zone.from_local_datetime(&local).earliest().ok_or_else(|| {
            Error::timezone(format!("local time {} does not exist in {}", local, name))
        })?;

        Ok(localized.timestamp())
    }
}

/// Resolver that treats local time as UTC
///
/// Deterministic and database-free; used in tests and appropriate for sites
/// on the prime meridian.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedUtcResolver;

impl TimezoneResolver for FixedUtcResolver {
    fn utc_seconds(&self, _latitude: f64, _longitude: f64, local: NaiveDateTime) -> Result<i64> {
        Ok(local.and_utc().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_fixed_utc_resolver() {
        let resolver = FixedUtcResolver;
        assert_eq!(
            resolver.utc_seconds(0.0, 0.0, local(2000, 1, 1, 0)).unwrap(),
            946684800
        );
        assert_eq!(
            resolver.utc_seconds(0.0, 0.0, local(2000, 1, 1, 12)).unwrap(),
            946684800 + 12 * 3600
        );
    }

    #[test]
    fn test_coordinate_resolver_la_paz() {
        // Bolivia is UTC-4 year round
        let resolver = CoordinateTimezoneResolver::new();
        let utc = resolver
            .utc_seconds(-16.35, -68.13, local(2018, 1, 1, 12))
            .unwrap();
        let expected = local(2018, 1, 1, 16).and_utc().timestamp();
        assert_eq!(utc, expected);
    }

    #[test]
    fn test_coordinate_resolver_utc_meridian() {
        let resolver = CoordinateTimezoneResolver::new();
        let utc = resolver.utc_seconds(51.48, 0.0, local(2018, 1, 1, 0)).unwrap();
        assert_eq!(utc, local(2018, 1, 1, 0).and_utc().timestamp());
    }
}
