//! Spreadsheet access
//!
//! The engine only ever reads and writes named cell ranges of strings and
//! recomputes every total itself - whatever formulas the sheet carries are
//! for human eyes. [`TabularStore`] is that boundary; [`SheetsStore`]
//! implements it against the Google Sheets values REST surface.

use serde::Deserialize;

use crate::error::{Result, SyncError};

/// Read/write access to named cell ranges of a tabular store.
///
/// Values are matrices of strings: outer vector rows, inner vector columns.
pub trait TabularStore {
    fn read(&self, range: &str) -> impl std::future::Future<Output = Result<Vec<Vec<String>>>> + Send;
    fn write(
        &self,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<serde_json::Value>>>,
}

/// Google Sheets values API client
#[derive(Debug, Clone)]
pub struct SheetsStore {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    api_token: String,
}

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

impl SheetsStore {
    pub fn new(spreadsheet_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, spreadsheet_id, api_token)
    }

    /// Construct against a non-default base URL (for testing with mock
    /// servers).
    pub fn with_base_url(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            api_token: api_token.into(),
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        )
    }

    /// Cheap connection test reading the sheet header row
    pub async fn probe(&self) -> Result<()> {
        self.read("A1:Z1").await.map(|_| ())
    }
}

impl TabularStore for SheetsStore {
    async fn read(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let response = self
            .http
            .get(self.values_url(range))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::Store(format!(
                "reading range {}: HTTP {}",
                range,
                response.status()
            )));
        }

        let body: ValueRange = response.json().await?;

        // An untouched range comes back without a values field at all.
        let values = body.values.unwrap_or_default();
        Ok(values
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect())
    }

    async fn write(&self, range: &str, values: Vec<Vec<String>>) -> Result<()> {
        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });

        let response = self
            .http
            .put(self.values_url(range))
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::Store(format!(
                "writing range {}: HTTP {}",
                range,
                response.status()
            )));
        }

        Ok(())
    }
}

/// Build an A1-style column range like "B9:B42"
pub fn column_range(column: &str, start_row: u32, end_row: u32) -> String {
    format!("{}{}:{}{}", column, start_row, column, end_row)
}

#[cfg(test)]
#[path = "sheets_tests.rs"]
mod tests;
