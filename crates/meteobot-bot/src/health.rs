//! Periodic health check and usage-statistics persistence.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use meteobot_weather::stats;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::handlers::SharedPipeline;

pub struct HealthCheck {
    pipeline: SharedPipeline,
    stats_file: PathBuf,
    interval: Duration,
}

impl HealthCheck {
    pub fn new(pipeline: SharedPipeline, stats_file: PathBuf, interval: Duration) -> Self {
        Self {
            pipeline,
            stats_file,
            interval,
        }
    }

    /// Run until `cancel` fires, then save statistics one last time
    pub async fn run(self, cancel: CancellationToken) {
        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.check_once().await,
            }
        }

        self.save_stats().await;
        tracing::info!("Health check stopped");
    }

    pub async fn check_once(&self) {
        tracing::info!("Running health check");

        if self.pipeline.quota().has_credential() {
            match self.pipeline.source().health_check().await {
                Ok(status) if status < 400 => tracing::info!(status, "Weather API reachable"),
                Ok(status) => tracing::warn!(status, "Weather API health check failed"),
                Err(e) => tracing::error!(error = %e, "Weather API health check error"),
            }
        } else {
            tracing::warn!("Weather API check skipped: no API key");
        }

        self.save_stats().await;
    }

    /// Persist the quota counter; failures are logged only
    pub async fn save_stats(&self) {
        let snapshot = self.pipeline.quota().snapshot_at(Utc::now());
        match stats::save(&self.stats_file, &snapshot).await {
            Ok(()) => {
                tracing::info!(path = %self.stats_file.display(), "API usage statistics saved")
            }
            Err(e) => tracing::error!(error = %e, "Could not save API usage statistics"),
        }
    }
}
