//! Market price API client
//!
//! Queries a per-item median price keyed by market hash name. The provider
//! answers with a success flag and a price string; "no success" means the
//! item has no sales data and resolves to a zero price, which downstream
//! code treats as a valid outcome rather than an error.

use serde::Deserialize;

use crate::error::{Result, SyncError};

const DEFAULT_BASE_URL: &str = "https://csgobackpack.net";
const USER_AGENT: &str = "steamsync/1.0";

/// Outcome of resolving a single item's price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOutcome {
    /// Provider returned a usable price
    Resolved,
    /// Provider reports no sales data; price is defined to be 0
    NoPriceAvailable,
}

/// Query parameters for a price lookup
#[derive(Debug, Clone)]
pub struct PriceOptions {
    /// Lookback window in days for the median price
    pub median_days: u32,
    /// ISO 4217 currency code
    pub currency: String,
}

impl Default for PriceOptions {
    fn default() -> Self {
        Self {
            median_days: 7,
            currency: "EUR".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemPriceResponse {
    /// The provider emits this as either a bool or the string "true"
    #[serde(default)]
    success: serde_json::Value,
    #[serde(default)]
    median_price: String,
}

impl ItemPriceResponse {
    fn succeeded(&self) -> bool {
        self.success.as_bool() == Some(true) || self.success.as_str() == Some("true")
    }
}

/// Normalize a provider price string before parsing: thousands separators
/// are stripped and the "-" no-sales sentinel becomes 0.
pub(crate) fn normalize_price(raw: &str) -> Result<f64> {
    let normalized = raw.replace(',', "").replace('-', "0");
    normalized
        .trim()
        .parse::<f64>()
        .map_err(|_| SyncError::PriceParse(raw.to_string()))
}

/// Client for the market price API
#[derive(Debug, Clone)]
pub struct MarketClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for MarketClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Construct against a non-default base URL (for testing with mock
    /// servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Check whether the provider is reachable at all
    pub async fn is_available(&self) -> bool {
        match self.http.get(&self.base_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Fetch the price for one item.
    ///
    /// A "no success" answer resolves to `(0.0, NoPriceAvailable)`. Any
    /// transport failure, non-success HTTP status or unparsable price is a
    /// hard error.
    pub async fn item_price(
        &self,
        market_hash_name: &str,
        options: &PriceOptions,
    ) -> Result<(f64, PriceOutcome)> {
        let url = format!("{}/api/GetItemPrice/", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("id", market_hash_name),
                ("time", &options.median_days.to_string()),
                ("extend", "true"),
                ("currency", &options.currency),
            ])
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status()));
        }

        let body: ItemPriceResponse = response.json().await?;

        if !body.succeeded() {
            return Ok((0.0, PriceOutcome::NoPriceAvailable));
        }

        let price = normalize_price(&body.median_price)?;
        Ok((price, PriceOutcome::Resolved))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
