//! Weather acquisition for meteobot
//!
//! Serves current conditions for a fixed set of cities from the
//! OpenWeatherMap API, with an in-memory cache, a persisted monthly request
//! budget and static demonstration data when live data is unavailable.

pub mod cache;
pub mod city;
pub mod clock;
pub mod fallback;
pub mod pipeline;
pub mod provider;
pub mod quota;
pub mod retry;
pub mod stats;
pub mod types;

pub use cache::WeatherCache;
pub use city::{find_city, City, CITIES, DEFAULT_CITY};
pub use clock::{Clock, SystemClock};
pub use pipeline::{FetchPipeline, FetchSettings};
pub use provider::{OpenWeatherProvider, WeatherSource};
pub use quota::{QuotaDenial, QuotaSnapshot, QuotaTracker};
pub use retry::RetryPolicy;
pub use types::*;
