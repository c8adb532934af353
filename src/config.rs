//! Application configuration
//!
//! Loaded from a JSON file. Optional fields carry explicit defaults;
//! required fields are checked by an enumerated table so a single load
//! reports every missing field at once. All intervals and budgets live
//! here - nothing is hard-coded in the engine.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SyncError};
use crate::format;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Required
    #[serde(default)]
    pub steam_user_id64: u64,
    #[serde(default)]
    pub steam_api_key: String,
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub sheets_api_token: String,

    // Pricing
    #[serde(default = "default_median_price_days")]
    pub median_price_days: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,

    // Sheet layout
    #[serde(default = "default_last_updated_cell")]
    pub last_updated_cell: String,
    #[serde(default = "default_error_cell")]
    pub error_cell: String,
    #[serde(default = "default_total_value_cell")]
    pub total_value_cell: String,
    #[serde(default = "default_difference_cell")]
    pub difference_cell: String,
    #[serde(default = "default_starting_row")]
    pub starting_row: u32,
    #[serde(default = "default_item_column")]
    pub item_column: String,
    #[serde(default = "default_amount_column")]
    pub amount_column: String,
    #[serde(default = "default_single_price_column")]
    pub single_price_column: String,
    #[serde(default = "default_total_price_column")]
    pub total_price_column: String,

    // Scheduling
    #[serde(default = "default_update_interval_hours")]
    pub update_interval_hours: u64,
    #[serde(default = "default_retry_minutes")]
    pub retry_minutes: u64,
    #[serde(default = "default_marker_retry_secs")]
    pub marker_retry_secs: u64,
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: u64,

    // Request budgets
    #[serde(default = "default_steam_requests_per_minute")]
    pub steam_requests_per_minute: u32,
    #[serde(default = "default_market_requests_per_hour")]
    pub market_requests_per_hour: u32,
    #[serde(default = "default_pricing_pause_every")]
    pub pricing_pause_every: u32,
    #[serde(default = "default_pricing_pause_secs")]
    pub pricing_pause_secs: u64,
}

fn default_median_price_days() -> u32 {
    7
}
fn default_currency() -> String {
    "EUR".to_string()
}
fn default_decimal_separator() -> String {
    ",".to_string()
}
fn default_last_updated_cell() -> String {
    "G2".to_string()
}
fn default_error_cell() -> String {
    "M2".to_string()
}
fn default_total_value_cell() -> String {
    "M4".to_string()
}
fn default_difference_cell() -> String {
    "M5".to_string()
}
fn default_starting_row() -> u32 {
    9
}
fn default_item_column() -> String {
    "B".to_string()
}
fn default_amount_column() -> String {
    "F".to_string()
}
fn default_single_price_column() -> String {
    "H".to_string()
}
fn default_total_price_column() -> String {
    "J".to_string()
}
fn default_update_interval_hours() -> u64 {
    12
}
fn default_retry_minutes() -> u64 {
    30
}
fn default_marker_retry_secs() -> u64 {
    60
}
fn default_cooldown_minutes() -> u64 {
    5
}
fn default_steam_requests_per_minute() -> u32 {
    15
}
fn default_market_requests_per_hour() -> u32 {
    1000
}
fn default_pricing_pause_every() -> u32 {
    20
}
fn default_pricing_pause_secs() -> u64 {
    60
}

/// Required fields, enumerated. Each entry names the JSON field and checks
/// that a value was actually supplied.
const REQUIRED_FIELDS: &[(&str, fn(&Config) -> bool)] = &[
    ("steam_user_id64", |c| c.steam_user_id64 != 0),
    ("steam_api_key", |c| !c.steam_api_key.trim().is_empty()),
    ("spreadsheet_id", |c| !c.spreadsheet_id.trim().is_empty()),
    ("sheets_api_token", |c| !c.sheets_api_token.trim().is_empty()),
];

impl Config {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Configuration(format!("opening config file {}: {}", path.display(), e))
        })?;

        let cfg: Config = serde_json::from_str(&content)
            .map_err(|e| SyncError::Configuration(format!("decoding config file: {}", e)))?;

        cfg.validate()?;

        Ok(cfg)
    }

    /// Check required fields and value constraints, collecting every
    /// violation into one error.
    pub fn validate(&self) -> Result<()> {
        let mut problems: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|(_, present)| !present(self))
            .map(|(name, _)| format!("field \"{}\" is required but empty", name))
            .collect();

        if let Err(e) = format::currency_sign(&self.currency) {
            problems.push(e.to_string());
        }

        if self.update_interval_hours == 0 {
            problems.push("field \"update_interval_hours\" must be at least 1".to_string());
        }

        if self.steam_requests_per_minute == 0 || self.market_requests_per_hour == 0 {
            problems.push("request budgets must be at least 1".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Configuration(format!(
                "validation failed: {}",
                problems.join("; ")
            )))
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
