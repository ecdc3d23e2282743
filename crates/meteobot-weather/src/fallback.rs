//! Hand-authored demonstration readings, served when live data is unavailable.

use crate::city::DEFAULT_CITY;
use crate::types::WeatherReading;

struct DemoReading {
    key: &'static str,
    temperature: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
    wind_speed: f64,
    description: &'static str,
}

const DEMO_READINGS: [DemoReading; 5] = [
    DemoReading {
        key: "taganrog",
        temperature: 12.3,
        feels_like: 10.8,
        humidity: 65,
        pressure: 1018,
        wind_speed: 2.1,
        description: "partly cloudy",
    },
    DemoReading {
        key: "matveev_kurgan",
        temperature: 11.5,
        feels_like: 9.7,
        humidity: 68,
        pressure: 1017,
        wind_speed: 3.2,
        description: "cloudy",
    },
    DemoReading {
        key: "natalyevka",
        temperature: 12.8,
        feels_like: 11.2,
        humidity: 63,
        pressure: 1018,
        wind_speed: 1.8,
        description: "few clouds",
    },
    DemoReading {
        key: "rostov",
        temperature: 13.5,
        feels_like: 12.1,
        humidity: 60,
        pressure: 1016,
        wind_speed: 2.5,
        description: "clear sky",
    },
    DemoReading {
        key: "sochi",
        temperature: 18.2,
        feels_like: 17.5,
        humidity: 72,
        pressure: 1014,
        wind_speed: 1.5,
        description: "sunny",
    },
];

/// Demonstration reading for `city_key`, or the default city's reading if
/// the key has none
pub fn demo_reading(city_key: &str) -> WeatherReading {
    let demo = DEMO_READINGS
        .iter()
        .find(|d| d.key == city_key)
        .or_else(|| DEMO_READINGS.iter().find(|d| d.key == DEFAULT_CITY))
        .unwrap_or(&DEMO_READINGS[0]);

    WeatherReading {
        temperature: demo.temperature,
        feels_like: demo.feels_like,
        humidity: demo.humidity,
        pressure: demo.pressure,
        wind_speed: demo.wind_speed,
        description: demo.description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::CITIES;

    #[test]
    fn test_every_city_has_its_own_reading() {
        for city in &CITIES {
            assert!(
                DEMO_READINGS.iter().any(|d| d.key == city.key),
                "no demo reading for {}",
                city.key
            );
        }
    }

    #[test]
    fn test_known_city_reading() {
        let reading = demo_reading("sochi");
        assert_eq!(reading.temperature, 18.2);
        assert_eq!(reading.humidity, 72);
        assert_eq!(reading.description, "sunny");
    }

    #[test]
    fn test_missing_key_uses_default_city() {
        assert_eq!(demo_reading("atlantis"), demo_reading(DEFAULT_CITY));
    }

    #[test]
    fn test_stable_across_calls() {
        assert_eq!(demo_reading("rostov"), demo_reading("rostov"));
    }
}
