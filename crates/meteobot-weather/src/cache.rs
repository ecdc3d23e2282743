//! In-memory per-city cache of the last reading.
//!
//! Entries are overwritten, never evicted. Staleness is evaluated lazily on
//! read against a caller-supplied TTL.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::types::CacheEntry;

/// True if `entry` is younger than `ttl` at `now`
pub fn is_fresh(entry: &CacheEntry, now: DateTime<Utc>, ttl: Duration) -> bool {
    now - entry.fetched_at < ttl
}

#[derive(Debug, Default)]
pub struct WeatherCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone out the entry for `city_key`, fresh or not
    pub fn lookup(&self, city_key: &str) -> Option<CacheEntry> {
        self.entries.lock().get(city_key).cloned()
    }

    /// The entry for `city_key` if it is still fresh
    pub fn lookup_fresh(
        &self,
        city_key: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<CacheEntry> {
        self.lookup(city_key).filter(|e| is_fresh(e, now, ttl))
    }

    /// Store `entry`, replacing the previous one for its city.
    ///
    /// Returns false and keeps the existing entry when it is newer than
    /// `entry`, so `fetched_at` never moves backwards for a city.
    pub fn store(&self, entry: CacheEntry) -> bool {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&entry.city_key) {
            if existing.fetched_at > entry.fetched_at {
                tracing::debug!(
                    city = %entry.city_key,
                    "Discarding reading older than cached entry"
                );
                return false;
            }
        }
        entries.insert(entry.city_key.clone(), entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Source, WeatherReading};
    use chrono::TimeZone;

    fn entry(key: &str, at: DateTime<Utc>, temperature: f64) -> CacheEntry {
        CacheEntry {
            city_key: key.to_string(),
            city_name: key.to_string(),
            reading: WeatherReading {
                temperature,
                feels_like: temperature,
                humidity: 50,
                pressure: 1013,
                wind_speed: 1.0,
                description: "clear sky".to_string(),
            },
            source: Source::Live,
            fetched_at: at,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let cache = WeatherCache::new();
        assert!(cache.lookup("taganrog").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_and_lookup() {
        let cache = WeatherCache::new();
        assert!(cache.store(entry("taganrog", t0(), 10.0)));
        assert_eq!(cache.lookup("taganrog").unwrap().reading.temperature, 10.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_overwrites_with_newer() {
        let cache = WeatherCache::new();
        cache.store(entry("sochi", t0(), 10.0));
        assert!(cache.store(entry("sochi", t0() + Duration::minutes(5), 20.0)));
        assert_eq!(cache.lookup("sochi").unwrap().reading.temperature, 20.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_rejects_older_entry() {
        let cache = WeatherCache::new();
        cache.store(entry("sochi", t0(), 10.0));
        assert!(!cache.store(entry("sochi", t0() - Duration::seconds(1), 99.0)));
        assert_eq!(cache.lookup("sochi").unwrap().reading.temperature, 10.0);
    }

    #[test]
    fn test_freshness_boundary() {
        let ttl = Duration::minutes(30);
        let e = entry("rostov", t0(), 10.0);
        assert!(is_fresh(&e, t0(), ttl));
        assert!(is_fresh(&e, t0() + Duration::minutes(29), ttl));
        assert!(!is_fresh(&e, t0() + ttl, ttl));
    }

    #[test]
    fn test_lookup_fresh_filters_stale() {
        let cache = WeatherCache::new();
        let ttl = Duration::minutes(30);
        cache.store(entry("rostov", t0(), 10.0));
        assert!(cache.lookup_fresh("rostov", t0() + Duration::minutes(1), ttl).is_some());
        assert!(cache.lookup_fresh("rostov", t0() + Duration::hours(1), ttl).is_none());
        // stale entries are still retrievable
        assert!(cache.lookup("rostov").is_some());
    }
}
