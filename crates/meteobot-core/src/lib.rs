//! Shared foundation for meteobot: configuration, error types and logging.

pub mod config;
pub mod error;

pub use config::{
    ChargePolicy, Config, HealthConfig, QuotaConfig, TelegramConfig, ValidationResult,
    WeatherConfig,
};
pub use error::{NetworkError, PersistenceError, ReqwestErrorExt};

use anyhow::Result;

/// Default log directives when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info,teloxide=warn";

/// Initialize the core application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    tracing::info!("meteobot core initialized");
    Ok(())
}
