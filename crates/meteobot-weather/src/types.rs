use chrono::{DateTime, Utc};

/// Normalized current-weather reading, whether live or demonstration data
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    /// Air temperature in °C
    pub temperature: f64,
    /// Apparent temperature in °C
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Sea-level pressure in hPa
    pub pressure: u32,
    /// Wind speed in m/s
    pub wind_speed: f64,
    pub description: String,
}

/// Where a cached reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Live,
    Fallback,
}

impl Source {
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

/// The last reading stored for a city
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub city_key: String,
    pub city_name: String,
    pub reading: WeatherReading,
    pub source: Source,
    pub fetched_at: DateTime<Utc>,
}

/// Errors surfaced by the fetch pipeline.
///
/// Upstream failures are absorbed into demonstration data, so the only
/// failure a caller sees is a bad city key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Unknown city: {0}")]
    UnknownCity(String),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UnknownCity(_) => "Unknown city. Use /help to see the supported cities.",
        }
    }
}

/// Coarse upstream failure category, used to pick a retry delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    RateLimited,
    Timeout,
    ServerError,
}

/// A single failed upstream attempt
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Request timed out")]
    Timeout,
    #[error("Rate limited (HTTP 429)")]
    RateLimited,
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl UpstreamError {
    pub fn kind(&self) -> UpstreamErrorKind {
        match self {
            Self::RateLimited => UpstreamErrorKind::RateLimited,
            Self::Timeout => UpstreamErrorKind::Timeout,
            Self::Status { .. } | Self::Transport(_) | Self::Parse(_) => {
                UpstreamErrorKind::ServerError
            }
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(UpstreamError::RateLimited.kind(), UpstreamErrorKind::RateLimited);
        assert_eq!(UpstreamError::Timeout.kind(), UpstreamErrorKind::Timeout);
        assert_eq!(
            UpstreamError::Status {
                status: 503,
                body: String::new()
            }
            .kind(),
            UpstreamErrorKind::ServerError
        );
        assert_eq!(
            UpstreamError::Parse("bad json".into()).kind(),
            UpstreamErrorKind::ServerError
        );
    }

    #[test]
    fn test_unknown_city_message() {
        let err = FetchError::UnknownCity("atlantis".into());
        assert_eq!(err.to_string(), "Unknown city: atlantis");
        assert!(err.user_message().contains("/help"));
    }
}
