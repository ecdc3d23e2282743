//! Monthly budget of upstream API calls.
//!
//! The counter resets when the calendar month (UTC) of the current time
//! differs from the month of the last reset. All state lives behind one
//! mutex that is never held across an await, so `acquire` is atomic even on
//! a multi-threaded runtime.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use parking_lot::Mutex;

/// Why a live call was not permitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QuotaDenial {
    #[error("weather API key not configured")]
    CredentialMissing,
    #[error("monthly limit of {limit} requests reached")]
    LimitReached { limit: u32 },
}

/// Point-in-time view of the counter, for persistence and `/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub count: u32,
    pub limit: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug)]
struct QuotaState {
    count: u32,
    reset_at: DateTime<Utc>,
}

impl QuotaState {
    fn should_reset(&self, now: DateTime<Utc>) -> bool {
        !same_month(self.reset_at, now)
    }

    fn reset(&mut self, now: DateTime<Utc>) {
        self.count = 0;
        self.reset_at = now;
    }
}

#[derive(Debug)]
pub struct QuotaTracker {
    limit: u32,
    has_credential: bool,
    state: Mutex<QuotaState>,
}

impl QuotaTracker {
    /// A fresh tracker whose month starts at `now`
    pub fn new(limit: u32, has_credential: bool, now: DateTime<Utc>) -> Self {
        Self {
            limit,
            has_credential,
            state: Mutex::new(QuotaState {
                count: 0,
                reset_at: now,
            }),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn has_credential(&self) -> bool {
        self.has_credential
    }

    pub fn count(&self) -> u32 {
        self.state.lock().count
    }

    /// True if `now` falls in a different calendar month than the last reset
    pub fn should_reset(&self, now: DateTime<Utc>) -> bool {
        self.state.lock().should_reset(now)
    }

    /// Zero the counter and anchor the month at `now`
    pub fn reset(&self, now: DateTime<Utc>) {
        self.state.lock().reset(now);
    }

    /// Charge one call if the budget and credential allow it
    pub fn try_consume(&self) -> bool {
        self.consume(&mut self.state.lock()).is_ok()
    }

    /// Reset if the month rolled over, then charge one call.
    ///
    /// Returns the count after charging.
    pub fn acquire(&self, now: DateTime<Utc>) -> Result<u32, QuotaDenial> {
        let mut state = self.state.lock();
        reset_if_due(&mut state, now);
        self.consume(&mut state)
    }

    fn consume(&self, state: &mut QuotaState) -> Result<u32, QuotaDenial> {
        if !self.has_credential {
            return Err(QuotaDenial::CredentialMissing);
        }
        if state.count >= self.limit {
            return Err(QuotaDenial::LimitReached { limit: self.limit });
        }
        state.count += 1;
        Ok(state.count)
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        let state = self.state.lock();
        self.view(&state)
    }

    /// Like [`snapshot`](Self::snapshot), but applies a due month reset first
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> QuotaSnapshot {
        let mut state = self.state.lock();
        reset_if_due(&mut state, now);
        self.view(&state)
    }

    fn view(&self, state: &QuotaState) -> QuotaSnapshot {
        QuotaSnapshot {
            count: state.count,
            limit: self.limit,
            reset_at: state.reset_at,
        }
    }

    /// Restore a persisted count, clamped to the limit
    pub fn restore(&self, count: u32) {
        self.state.lock().count = count.min(self.limit);
    }

    /// Restore the persisted reset anchor
    pub fn restore_reset_at(&self, reset_at: DateTime<Utc>) {
        self.state.lock().reset_at = reset_at;
    }
}

fn reset_if_due(state: &mut QuotaState, now: DateTime<Utc>) {
    if state.should_reset(now) {
        tracing::info!(
            previous = state.count,
            "Resetting API request counter (new month)"
        );
        state.reset(now);
    }
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Midnight UTC on the first day of the month after `now`
pub fn next_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}
