//! Integration tests for the OpenWeatherMap client and fetch pipeline using wiremock.

use std::time::Duration;

use meteobot_core::ChargePolicy;
use meteobot_weather::{
    fallback::demo_reading, find_city, FetchPipeline, FetchSettings, OpenWeatherProvider,
    QuotaTracker, RetryPolicy, Source, SystemClock, UpstreamError, WeatherCache, WeatherSource,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn weather_body(temp: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": 39.7015, "lat": 47.2357},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds"}],
        "main": {"temp": temp, "feels_like": temp - 2.0, "humidity": 58, "pressure": 1021},
        "wind": {"speed": 3.4, "deg": 120},
        "name": "Rostov-on-Don"
    })
}

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new(&server.uri(), "test-key", "en", Duration::from_secs(2)).unwrap()
}

fn pipeline(server: &MockServer, limit: u32) -> FetchPipeline<OpenWeatherProvider> {
    FetchPipeline::new(
        provider(server),
        SystemClock,
        WeatherCache::new(),
        QuotaTracker::new(limit, true, chrono::Utc::now()),
        FetchSettings {
            cache_ttl: chrono::Duration::minutes(30),
            retry: RetryPolicy::new(3, Duration::from_millis(10)),
            charge_policy: ChargePolicy::PerFetch,
        },
    )
}

#[tokio::test]
async fn test_current_sends_coordinates_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "47.2357"))
        .and(query_param("lon", "39.7015"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(21.5)))
        .expect(1)
        .mount(&server)
        .await;

    let city = find_city("rostov").unwrap();
    let reading = provider(&server).current(city).await.unwrap();

    assert_eq!(reading.temperature, 21.5);
    assert_eq!(reading.feels_like, 19.5);
    assert_eq!(reading.humidity, 58);
    assert_eq!(reading.pressure, 1021);
    assert_eq!(reading.wind_speed, 3.4);
    assert_eq!(reading.description, "broken clouds");
}

#[tokio::test]
async fn test_current_maps_statuses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "43.6028"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "47.2362"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let provider = provider(&server);

    let err = provider.current(find_city("sochi").unwrap()).await.unwrap_err();
    assert!(matches!(err, UpstreamError::RateLimited));

    let err = provider.current(find_city("taganrog").unwrap()).await.unwrap_err();
    match err {
        UpstreamError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_current_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .current(find_city("sochi").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Parse(_)));
}

#[tokio::test]
async fn test_pipeline_retries_rate_limit_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(17.0)))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline(&server, 950);
    let entry = pipeline.fetch("rostov", false).await.unwrap();

    assert_eq!(entry.source, Source::Live);
    assert_eq!(entry.reading.temperature, 17.0);
    assert_eq!(entry.city_name, "Rostov-on-Don");
    assert_eq!(pipeline.quota().count(), 1);
}

#[tokio::test]
async fn test_pipeline_falls_back_after_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let pipeline = pipeline(&server, 950);
    let entry = pipeline.fetch("sochi", false).await.unwrap();

    assert_eq!(entry.source, Source::Fallback);
    assert_eq!(entry.reading, demo_reading("sochi"));
}

#[tokio::test]
async fn test_pipeline_cache_hit_skips_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(8.0)))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline(&server, 950);
    let first = pipeline.fetch("taganrog", false).await.unwrap();
    let second = pipeline.fetch("taganrog", false).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(pipeline.quota().count(), 1);
}

#[tokio::test]
async fn test_health_check_does_not_touch_weather_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let status = provider(&server).health_check().await.unwrap();
    assert_eq!(status, 200);
}
