//! Persisted sliding-window request budgets
//!
//! One [`RateLimiter`] exists per external provider, each with its own
//! budget, window and state file. The limiter never issues requests and
//! never persists on its own: callers check the budget before a batch,
//! [`record`](RateLimiter::record) after every successful call, and
//! [`save`](RateLimiter::save) once the batch is done. A crash between a
//! successful call and the save loses at most that batch's counts.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Request counter state persisted between runs.
///
/// The JSON key names match the state files written by earlier releases so
/// existing files keep loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RateLimitState {
    #[serde(rename = "lastRequestTime", default)]
    pub last_request_time: Option<DateTime<Utc>>,
    #[serde(rename = "requestCount", default)]
    pub request_count: u32,
}

/// Sliding-window request budget for a single provider
#[derive(Debug)]
pub struct RateLimiter {
    provider: &'static str,
    max_requests: u32,
    window: Duration,
    path: PathBuf,
}

impl RateLimiter {
    pub fn new(
        provider: &'static str,
        max_requests: u32,
        window: Duration,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            max_requests,
            window,
            path: path.into(),
        }
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted state. A missing file is a zero-value state, not
    /// an error.
    pub fn load(&self) -> Result<RateLimitState> {
        if !self.path.exists() {
            return Ok(RateLimitState::default());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| SyncError::Persistence {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Persist the state. Callers decide when; typically once after each
    /// batch of outbound calls.
    pub fn save(&self, state: &RateLimitState) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, content).map_err(|e| SyncError::Persistence {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Pre-flight admission check for a batch of `potential` requests.
    ///
    /// Resets the counter first if the window has elapsed since the last
    /// request, then admits iff the limit would not be reached. Strictly
    /// less than the limit: one unit of headroom always remains.
    pub fn within_budget(&self, state: &mut RateLimitState, potential: u32) -> bool {
        self.within_budget_at(state, potential, Utc::now())
    }

    pub(crate) fn within_budget_at(
        &self,
        state: &mut RateLimitState,
        potential: u32,
        now: DateTime<Utc>,
    ) -> bool {
        match state.last_request_time {
            Some(last) if now - last <= self.window => {}
            _ => state.request_count = 0,
        }

        state.request_count + potential < self.max_requests
    }

    /// Count one successful outbound call
    pub fn record(&self, state: &mut RateLimitState) {
        state.request_count += 1;
        state.last_request_time = Some(Utc::now());
    }

    /// Convenience for error reporting when a check fails
    pub fn budget_error(&self, state: &RateLimitState, requested: u32) -> SyncError {
        SyncError::BudgetExceeded {
            provider: self.provider,
            used: state.request_count,
            requested,
            limit: self.max_requests,
        }
    }
}

#[cfg(test)]
#[path = "ratelimit_tests.rs"]
mod tests;
