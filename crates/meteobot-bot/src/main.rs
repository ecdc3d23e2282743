//! meteobot - Telegram weather bot
//!
//! - `commands` - command parsing
//! - `handlers` - dispatcher endpoint
//! - `presentation` - message text
//! - `health` - periodic API check and stats persistence

mod commands;
mod handlers;
mod health;
mod presentation;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use meteobot_core::Config;
use meteobot_weather::{
    stats, FetchPipeline, FetchSettings, OpenWeatherProvider, QuotaTracker, SystemClock,
    WeatherCache,
};
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::commands::Command;
use crate::handlers::SharedPipeline;
use crate::health::HealthCheck;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    meteobot_core::init()?;

    let (config, _warnings) = Config::load_validated().context("Failed to load configuration")?;

    let pipeline = build_pipeline(&config)?;

    match stats::restore(&config.quota.stats_file, pipeline.quota()).await {
        Ok(Some(_)) => {}
        Ok(None) => tracing::info!("No saved API usage statistics"),
        Err(e) => tracing::error!(error = %e, "Could not load API usage statistics"),
    }

    let cancel = CancellationToken::new();

    let health = HealthCheck::new(
        pipeline.clone(),
        config.quota.stats_file.clone(),
        Duration::from_secs(u64::from(config.health.interval_minutes) * 60),
    );
    let health_task = tokio::spawn(health.run(cancel.clone()));

    let bot = Bot::new(&config.telegram.bot_token);

    let handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handlers::handle_command);

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![pipeline])
        .default_handler(|upd| async move {
            tracing::debug!(update = ?upd.id, "Unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .build();

    let shutdown = dispatcher.shutdown_token();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_signal() => {}
            _ = signal_cancel.cancelled() => return,
        }
        tracing::info!("Shutdown signal received");
        signal_cancel.cancel();
        match shutdown.shutdown() {
            Ok(stopped) => stopped.await,
            Err(e) => tracing::warn!(error = %e, "Dispatcher was not running"),
        }
    });

    tracing::info!("Bot is starting...");
    dispatcher.dispatch().await;

    cancel.cancel();
    if let Err(e) = health_task.await {
        tracing::error!(error = %e, "Health check task failed");
    }

    tracing::info!("Bot stopped");
    Ok(())
}

fn build_pipeline(config: &Config) -> Result<SharedPipeline> {
    let weather = &config.weather;

    let provider = OpenWeatherProvider::new(
        &weather.api_base_url,
        weather.api_key.as_deref().unwrap_or_default(),
        &weather.language,
        Duration::from_secs(weather.request_timeout_secs),
    )
    .context("Failed to build weather API client")?;

    let quota = QuotaTracker::new(
        config.quota.monthly_limit,
        weather.has_api_key(),
        chrono::Utc::now(),
    );
    if !quota.has_credential() {
        tracing::warn!("Weather API key not found. Serving demonstration data.");
    }

    Ok(Arc::new(FetchPipeline::new(
        provider,
        SystemClock,
        WeatherCache::new(),
        quota,
        FetchSettings::from_config(config),
    )))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
