//! Weather acquisition: cache, then quota, then upstream with retries, then
//! demonstration data.
//!
//! Quota is charged before the retry loop, so one logical fetch costs one
//! unit no matter how many attempts it takes (`ChargePolicy::PerFetch`).
//! `ChargePolicy::PerAttempt` charges every attempt instead.

use chrono::Duration;
use meteobot_core::{ChargePolicy, Config};

use crate::cache::WeatherCache;
use crate::city::{find_city, City};
use crate::clock::{Clock, SystemClock};
use crate::fallback::demo_reading;
use crate::provider::WeatherSource;
use crate::quota::QuotaTracker;
use crate::retry::RetryPolicy;
use crate::types::{CacheEntry, FetchError, Source, UpstreamErrorKind, WeatherReading};

/// Tunables for a [`FetchPipeline`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
    pub charge_policy: ChargePolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::minutes(30),
            retry: RetryPolicy::default(),
            charge_policy: ChargePolicy::PerFetch,
        }
    }
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache_ttl: Duration::minutes(i64::from(config.weather.cache_ttl_minutes)),
            retry: RetryPolicy::new(
                config.weather.max_retries,
                std::time::Duration::from_secs(config.weather.retry_delay_secs),
            ),
            charge_policy: config.quota.charge_policy,
        }
    }
}

pub struct FetchPipeline<S, C = SystemClock> {
    source: S,
    clock: C,
    cache: WeatherCache,
    quota: QuotaTracker,
    settings: FetchSettings,
}

impl<S: WeatherSource, C: Clock> FetchPipeline<S, C> {
    pub fn new(
        source: S,
        clock: C,
        cache: WeatherCache,
        quota: QuotaTracker,
        settings: FetchSettings,
    ) -> Self {
        Self {
            source,
            clock,
            cache,
            quota,
            settings,
        }
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current weather for `city_key`.
    ///
    /// Always yields a live or demonstration reading for a known city;
    /// the only error is an unknown key, which touches no state.
    pub async fn fetch(
        &self,
        city_key: &str,
        force_refresh: bool,
    ) -> Result<CacheEntry, FetchError> {
        let Some(city) = find_city(city_key) else {
            tracing::error!(city = city_key, "City not found");
            return Err(FetchError::UnknownCity(city_key.to_string()));
        };

        let now = self.clock.now();

        if force_refresh {
            tracing::info!(city = city.name, "Forced refresh requested");
        } else if let Some(entry) = self
            .cache
            .lookup_fresh(city.key, now, self.settings.cache_ttl)
        {
            tracing::info!(
                city = city.name,
                age_secs = (now - entry.fetched_at).num_seconds(),
                "Using cached weather data"
            );
            return Ok(entry);
        }

        let live = if self.settings.retry.max_attempts == 0 {
            tracing::warn!("No upstream attempts configured. Using demonstration data.");
            None
        } else {
            match self.quota.acquire(now) {
                Ok(used) => {
                    tracing::info!(
                        used,
                        limit = self.quota.limit(),
                        "API requests used this month"
                    );
                    self.call_upstream(city).await
                }
                Err(denial) => {
                    tracing::warn!(
                        %denial,
                        "Upstream call not permitted. Using demonstration data."
                    );
                    None
                }
            }
        };

        let (reading, source) = match live {
            Some(reading) => (reading, Source::Live),
            None => {
                tracing::info!(city = city.name, "Using demonstration data");
                (demo_reading(city.key), Source::Fallback)
            }
        };

        // Stamped on completion so a slow live call is not shadowed by a
        // fallback from a fetch that started later
        let entry = CacheEntry {
            city_key: city.key.to_string(),
            city_name: city.name.to_string(),
            reading,
            source,
            fetched_at: self.clock.now(),
        };
        self.cache.store(entry.clone());

        Ok(self.cache.lookup(city.key).unwrap_or(entry))
    }

    /// Run the attempt loop; `None` once attempts (or per-attempt quota)
    /// run out
    async fn call_upstream(&self, city: &City) -> Option<WeatherReading> {
        let retry = self.settings.retry;

        for attempt in 1..=retry.max_attempts {
            if attempt > 1 && self.settings.charge_policy == ChargePolicy::PerAttempt {
                match self.quota.acquire(self.clock.now()) {
                    Ok(used) => {
                        tracing::info!(
                            used,
                            limit = self.quota.limit(),
                            "API requests used this month"
                        );
                    }
                    Err(denial) => {
                        tracing::warn!(%denial, attempt, "Retry not permitted by quota");
                        return None;
                    }
                }
            }

            tracing::info!(attempt, city = city.name, "Requesting current weather");

            let err = match self.source.current(city).await {
                Ok(reading) => return Some(reading),
                Err(err) => err,
            };

            match err.kind() {
                UpstreamErrorKind::RateLimited => {
                    tracing::warn!(attempt, "Rate limited by weather API");
                }
                UpstreamErrorKind::Timeout => {
                    tracing::error!(attempt, "Weather API request timed out");
                }
                UpstreamErrorKind::ServerError => {
                    tracing::warn!(attempt, error = %err, "Weather API request failed");
                }
            }

            if let Some(delay) = retry.delay_after(attempt, err.kind()) {
                tracing::debug!(?delay, "Waiting before next attempt");
                tokio::time::sleep(delay).await;
            }
        }

        tracing::error!(
            attempts = retry.max_attempts,
            city = city.name,
            "All weather API attempts failed"
        );
        None
    }
}
