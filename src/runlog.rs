//! First/last run tracking file
//!
//! Small JSON file recording when the engine first ran and when it last
//! completed a cycle. Only used to warn the operator when runs happen
//! suspiciously close together; never an enforcement gate. The key names
//! match the file written by earlier releases.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunTimes {
    #[serde(rename = "FirstRun", default)]
    pub first_run: Option<DateTime<Utc>>,
    #[serde(rename = "LastRun", default)]
    pub last_run: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the recorded run times. A missing or empty file means the
    /// engine has never run.
    pub fn load(&self) -> Result<RunTimes> {
        if !self.path.exists() {
            return Ok(RunTimes::default());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| SyncError::Persistence {
            path: self.path.clone(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(RunTimes::default());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Record a completed cycle at `now`, keeping the first-run stamp
    pub fn record(&self, now: DateTime<Utc>) -> Result<RunTimes> {
        let mut times = self.load().unwrap_or_default();
        if times.first_run.is_none() {
            times.first_run = Some(now);
        }
        times.last_run = Some(now);

        let content = serde_json::to_string_pretty(&times)?;
        std::fs::write(&self.path, content).map_err(|e| SyncError::Persistence {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(times)
    }

    /// True when the last recorded run is within `threshold` of `now`
    pub fn ran_recently(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        match self.load() {
            Ok(times) => match times.last_run {
                Some(last) => now - last < threshold,
                None => false,
            },
            Err(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "runlog_tests.rs"]
mod tests;
