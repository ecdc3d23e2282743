//! Plain-text persistence of the request counter.
//!
//! File format, two lines:
//!
//! ```text
//! Requests used: 12/950
//! Last reset date: 2026-03-01T00:00:00+00:00
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use meteobot_core::PersistenceError;
use tokio::fs;

use crate::quota::{QuotaSnapshot, QuotaTracker};

const COUNT_PREFIX: &str = "Requests used:";
const RESET_PREFIX: &str = "Last reset date:";

/// Values recovered from a stats file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedStats {
    pub count: u32,
    /// Absent when the second line is missing or unreadable
    pub reset_at: Option<DateTime<Utc>>,
}

pub fn render(snapshot: &QuotaSnapshot) -> String {
    format!(
        "{COUNT_PREFIX} {}/{}\n{RESET_PREFIX} {}\n",
        snapshot.count,
        snapshot.limit,
        snapshot.reset_at.to_rfc3339()
    )
}

pub fn parse(contents: &str) -> Result<PersistedStats, PersistenceError> {
    let mut lines = contents.lines().map(str::trim);

    let count = lines
        .next()
        .and_then(|line| line.strip_prefix(COUNT_PREFIX))
        .and_then(|rest| rest.trim().split('/').next())
        .and_then(|n| n.trim().parse::<u32>().ok())
        .ok_or_else(|| PersistenceError::LoadFailed("missing or malformed request count".into()))?;

    let reset_at = lines
        .next()
        .and_then(|line| line.strip_prefix(RESET_PREFIX))
        .and_then(|rest| DateTime::parse_from_rfc3339(rest.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Ok(PersistedStats { count, reset_at })
}

/// Write the snapshot, replacing the file in one rename so readers never
/// observe half of it
pub async fn save(path: &Path, snapshot: &QuotaSnapshot) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| PersistenceError::SaveFailed(e.to_string()))?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, render(snapshot))
        .await
        .map_err(|e| PersistenceError::SaveFailed(e.to_string()))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| PersistenceError::SaveFailed(e.to_string()))?;

    tracing::debug!(path = %path.display(), count = snapshot.count, "Saved API usage statistics");
    Ok(())
}

/// Read a stats file; `Ok(None)` if it does not exist yet
pub async fn load(path: &Path) -> Result<Option<PersistedStats>, PersistenceError> {
    match fs::read_to_string(path).await {
        Ok(contents) => parse(&contents).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PersistenceError::LoadFailed(e.to_string())),
    }
}

/// Load `path` into `quota`, restoring the count and, when the file carries
/// one, the reset date.
///
/// Returns what was restored, or `None` if there was no file.
pub async fn restore(
    path: &Path,
    quota: &QuotaTracker,
) -> Result<Option<PersistedStats>, PersistenceError> {
    let Some(stats) = load(path).await? else {
        return Ok(None);
    };

    quota.restore(stats.count);
    match stats.reset_at {
        Some(reset_at) => quota.restore_reset_at(reset_at),
        None => tracing::warn!("Stats file has no reset date; keeping the current month"),
    }

    tracing::info!(count = quota.count(), limit = quota.limit(), "Restored API usage statistics");
    Ok(Some(stats))
}
