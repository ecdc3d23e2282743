//! The fixed set of cities the bot reports on.

/// A supported city
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub key: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// Key of the city served by the bare `/weather` command
pub const DEFAULT_CITY: &str = "taganrog";

pub const CITIES: [City; 5] = [
    City {
        key: "taganrog",
        name: "Taganrog",
        latitude: 47.2362,
        longitude: 38.8969,
    },
    City {
        key: "matveev_kurgan",
        name: "Matveev Kurgan",
        latitude: 47.5667,
        longitude: 38.8667,
    },
    City {
        key: "natalyevka",
        name: "Natalyevka",
        latitude: 47.1631,
        longitude: 38.6531,
    },
    City {
        key: "rostov",
        name: "Rostov-on-Don",
        latitude: 47.2357,
        longitude: 39.7015,
    },
    City {
        key: "sochi",
        name: "Sochi",
        latitude: 43.6028,
        longitude: 39.7342,
    },
];

/// Look up a city by key
pub fn find_city(key: &str) -> Option<&'static City> {
    CITIES.iter().find(|c| c.key == key)
}
