//! User-facing message text.

use chrono::{DateTime, Duration, Utc};
use meteobot_weather::quota::next_reset;
use meteobot_weather::{CacheEntry, FetchError, QuotaSnapshot, Source};

pub const FETCHING: &str = "Fetching weather data... ⏳";

const FALLBACK_NOTE: &str =
    "\n⚠️ Demonstration data (API key problem or monthly request limit reached)";

pub fn weather_message(entry: &CacheEntry) -> String {
    let marker = match entry.source {
        Source::Live => "🌐",
        Source::Fallback => "🔧",
    };
    let r = &entry.reading;

    let mut message = format!(
        "{marker} Weather in {}:\n\n\
         🌡 Temperature: {}°C\n\
         🤔 Feels like: {}°C\n\
         💧 Humidity: {}%\n\
         📈 Pressure: {} hPa\n\
         💨 Wind: {} m/s\n\
         📊 Conditions: {}\n\n\
         🕒 Updated: {} UTC",
        entry.city_name,
        r.temperature,
        r.feels_like,
        r.humidity,
        r.pressure,
        r.wind_speed,
        r.description,
        entry.fetched_at.format("%H:%M:%S"),
    );

    if entry.source == Source::Fallback {
        message.push_str(FALLBACK_NOTE);
    }
    message
}

pub fn stats_message(snapshot: &QuotaSnapshot, cache_ttl: Duration, now: DateTime<Utc>) -> String {
    let days_left = (next_reset(now).date_naive() - now.date_naive()).num_days();
    format!(
        "📊 API usage:\n\n\
         🔢 Requests used: {}/{}\n\
         📅 Counter resets in: {} days\n\
         ⏱ Cache lifetime: {} minutes",
        snapshot.count,
        snapshot.limit,
        days_left,
        cache_ttl.num_minutes(),
    )
}

pub fn welcome_message(first_name: Option<&str>) -> String {
    let greeting = match first_name {
        Some(name) => format!("Hello {name}! 🌤"),
        None => "Hello! 🌤".to_string(),
    };
    format!(
        "{greeting}\n\n\
         Available commands:\n\
         /weather - weather in Taganrog\n\
         /weather_matveev - weather in Matveev Kurgan\n\
         /weather_natalyevka - weather in Natalyevka\n\
         /weather_rostov - weather in Rostov-on-Don\n\
         /weather_sochi - weather in Sochi\n\
         /stats - API usage statistics\n\n\
         Add 'force' to any weather command to refresh the data,\n\
         for example: /weather force"
    )
}

pub fn fetch_error_message(err: &FetchError) -> String {
    format!("❌ {}", err.user_message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use meteobot_weather::fallback::demo_reading;

    fn entry(source: Source) -> CacheEntry {
        CacheEntry {
            city_key: "sochi".into(),
            city_name: "Sochi".into(),
            reading: demo_reading("sochi"),
            source,
            fetched_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 5, 7).unwrap(),
        }
    }

    #[test]
    fn test_live_weather_message() {
        let msg = weather_message(&entry(Source::Live));
        assert!(msg.starts_with("🌐 Weather in Sochi:"));
        assert!(msg.contains("Temperature: 18.2°C"));
        assert!(msg.contains("Feels like: 17.5°C"));
        assert!(msg.contains("Humidity: 72%"));
        assert!(msg.contains("Pressure: 1014 hPa"));
        assert!(msg.contains("Wind: 1.5 m/s"));
        assert!(msg.contains("Conditions: sunny"));
        assert!(msg.contains("Updated: 09:05:07 UTC"));
        assert!(!msg.contains("Demonstration"));
    }

    #[test]
    fn test_fallback_weather_message_is_annotated() {
        let msg = weather_message(&entry(Source::Fallback));
        assert!(msg.starts_with("🔧"));
        assert!(msg.contains("Demonstration data"));
    }

    #[test]
    fn test_stats_message() {
        let snapshot = QuotaSnapshot {
            count: 42,
            limit: 950,
            reset_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
        };
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap();
        let msg = stats_message(&snapshot, Duration::minutes(30), now);

        assert!(msg.contains("Requests used: 42/950"));
        assert!(msg.contains("resets in: 18 days"));
        assert!(msg.contains("Cache lifetime: 30 minutes"));
    }

    #[test]
    fn test_stats_message_after_month_rollover() {
        let last_day = Utc.with_ymd_and_hms(2026, 3, 31, 20, 0, 0).unwrap();
        let quota = meteobot_weather::QuotaTracker::new(2, true, last_day);
        quota.acquire(last_day).unwrap();
        quota.acquire(last_day).unwrap();

        let now = Utc.with_ymd_and_hms(2026, 4, 2, 9, 0, 0).unwrap();
        let msg = stats_message(&quota.snapshot_at(now), Duration::minutes(30), now);

        assert!(msg.contains("Requests used: 0/2"), "{msg}");
        assert!(msg.contains("resets in: 29 days"), "{msg}");
    }

    #[test]
    fn test_welcome_lists_commands() {
        let msg = welcome_message(Some("Anna"));
        assert!(msg.starts_with("Hello Anna!"));
        for cmd in ["/weather_matveev", "/weather_sochi", "/stats", "force"] {
            assert!(msg.contains(cmd), "missing {cmd}");
        }
        assert!(welcome_message(None).starts_with("Hello!"));
    }

    #[test]
    fn test_unknown_city_message() {
        let msg = fetch_error_message(&FetchError::UnknownCity("atlantis".into()));
        assert!(msg.contains("Unknown city"));
    }
}
