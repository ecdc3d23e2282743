//! OpenWeatherMap current-weather client.

use async_trait::async_trait;
use meteobot_core::{NetworkError, ReqwestErrorExt};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::city::City;
use crate::types::{UpstreamError, WeatherReading};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that can produce a live reading for a city.
///
/// One call is one HTTP attempt; retries are the caller's business.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, city: &City) -> Result<WeatherReading, UpstreamError>;
}

#[async_trait]
impl<S: WeatherSource + ?Sized> WeatherSource for Arc<S> {
    async fn current(&self, city: &City) -> Result<WeatherReading, UpstreamError> {
        (**self).current(city).await
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    main: ApiMain,
    #[serde(default)]
    weather: Vec<ApiCondition>,
    #[serde(default)]
    wind: Option<ApiWind>,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    #[serde(default)]
    speed: f64,
}

impl From<ApiResponse> for WeatherReading {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from(resp: ApiResponse) -> Self {
        Self {
            temperature: resp.main.temp,
            feels_like: resp.main.feels_like,
            humidity: resp.main.humidity.round().clamp(0.0, 100.0) as u8,
            pressure: resp.main.pressure.round().max(0.0) as u32,
            wind_speed: resp.wind.map(|w| w.speed).unwrap_or(0.0),
            description: resp
                .weather
                .into_iter()
                .next()
                .map(|c| c.description)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    language: String,
}

impl OpenWeatherProvider {
    pub fn new(
        base_url: &str,
        api_key: &str,
        language: &str,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            language: language.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the API host without spending quota.
    ///
    /// Returns the HTTP status of a `HEAD` to the base URL.
    pub async fn health_check(&self) -> Result<u16, NetworkError> {
        let response = self
            .client
            .head(&self.base_url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;
        Ok(response.status().as_u16())
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherProvider {
    async fn current(&self, city: &City) -> Result<WeatherReading, UpstreamError> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", city.latitude.to_string()),
                ("lon", city.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
                ("lang", self.language.clone()),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: ApiResponse = response
                    .json()
                    .await
                    .map_err(|e| UpstreamError::Parse(e.to_string()))?;
                Ok(body.into())
            }
            StatusCode::TOO_MANY_REQUESTS => Err(UpstreamError::RateLimited),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(UpstreamError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
