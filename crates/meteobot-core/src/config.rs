use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable holding the Telegram bot token
pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
/// Environment variable holding the OpenWeatherMap API key
pub const ENV_WEATHER_API_KEY: &str = "OPENWEATHER_API_KEY";
/// Environment variable overriding the weather API base URL
pub const ENV_WEATHER_BASE_URL: &str = "OPENWEATHER_BASE_URL";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Telegram settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Upstream weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Monthly request budget
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Periodic health check
    #[serde(default)]
    pub health: HealthConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather (usually supplied via `BOT_TOKEN`)
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. Without it every request is served from
    /// demonstration data.
    pub api_key: Option<String>,

    /// Base URL of the weather API
    pub api_base_url: String,

    /// Language code for condition descriptions
    pub language: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// How long a cached reading stays fresh, in minutes
    pub cache_ttl_minutes: u32,

    /// Upstream attempts per fetch
    pub max_retries: u32,

    /// Base delay between attempts, in seconds
    pub retry_delay_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://api.openweathermap.org".to_string(),
            language: "en".to_string(),
            request_timeout_secs: 10,
            cache_ttl_minutes: 30,
            max_retries: 3,
            retry_delay_secs: 2,
        }
    }
}

impl WeatherConfig {
    /// Check if an API key is configured (not empty or a placeholder)
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty() && !k.starts_with("YOUR_"))
    }
}

/// When the monthly budget is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChargePolicy {
    /// One unit per logical fetch, regardless of retries
    #[default]
    PerFetch,
    /// One unit per HTTP attempt
    PerAttempt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Maximum upstream calls per calendar month. Kept below the provider's
    /// free-tier ceiling of 1000.
    pub monthly_limit: u32,

    /// How retries are charged against the budget
    pub charge_policy: ChargePolicy,

    /// Where usage statistics are persisted
    pub stats_file: PathBuf,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            monthly_limit: 950,
            charge_policy: ChargePolicy::PerFetch,
            stats_file: default_stats_file(),
        }
    }
}

fn default_stats_file() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("meteobot"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("api_stats.txt")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Minutes between health checks (default: 60)
    pub interval_minutes: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 60,
        }
    }
}

impl Config {
    /// Load configuration from the default location and apply environment
    /// overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from `path`, creating a default file if it doesn't
    /// exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Overlay secrets and endpoints from the environment.
    ///
    /// `lookup` is usually `std::env::var`; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(ENV_BOT_TOKEN) {
            self.telegram.bot_token = token;
        }
        if let Some(key) = non_empty(ENV_WEATHER_API_KEY) {
            self.weather.api_key = Some(key);
        }
        if let Some(url) = non_empty(ENV_WEATHER_BASE_URL) {
            self.weather.api_base_url = url;
        }
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.telegram.bot_token.trim().is_empty() {
            result.add_error(
                "telegram.bot_token",
                format!("Bot token is not set (use {})", ENV_BOT_TOKEN),
            );
        }

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);

        if !self.weather.has_api_key() {
            result.add_warning(
                "weather.api_key",
                "Weather API key not configured - serving demonstration data only",
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.weather.cache_ttl_minutes == 0 {
            result.add_warning(
                "weather.cache_ttl_minutes",
                "Caching disabled (0 minutes) - every request hits the API",
            );
        } else if self.weather.cache_ttl_minutes > 1440 {
            result.add_warning(
                "weather.cache_ttl_minutes",
                "Cache lifetime is more than 24 hours",
            );
        }

        if self.weather.max_retries == 0 {
            result.add_warning(
                "weather.max_retries",
                "No upstream attempts allowed - serving demonstration data only",
            );
        }

        if self.quota.monthly_limit == 0 {
            result.add_warning(
                "quota.monthly_limit",
                "Monthly limit is 0 - serving demonstration data only",
            );
        } else if self.quota.monthly_limit > 1000 {
            result.add_warning(
                "quota.monthly_limit",
                "Monthly limit exceeds the free-tier ceiling of 1000 requests",
            );
        }

        if self.health.interval_minutes == 0 {
            result.add_error(
                "health.interval_minutes",
                "Health check interval must be greater than 0",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("meteobot");

        Ok(config_dir.join("config.toml"))
    }
}
