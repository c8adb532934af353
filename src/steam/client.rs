//! Steam API client for CS2 (app id 730)
//!
//! Two read-only endpoints: the game-server status query (gated behind an
//! API key) and the public community inventory listing.

use serde::Deserialize;

use crate::error::{Result, SyncError};

const DEFAULT_API_BASE: &str = "https://api.steampowered.com";
const DEFAULT_COMMUNITY_BASE: &str = "https://steamcommunity.com";
const USER_AGENT: &str = "steamsync/1.0";

/// Status of a single Steam subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServiceStatus {
    Online,
    Delayed,
    Offline,
}

impl ServiceStatus {
    fn parse(s: &str) -> Self {
        match s {
            "normal" => ServiceStatus::Online,
            "delayed" => ServiceStatus::Delayed,
            // Unknown strings are treated as offline rather than guessed at
            _ => ServiceStatus::Offline,
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Online => write!(f, "online"),
            ServiceStatus::Delayed => write!(f, "delayed"),
            ServiceStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Combined status of the Steam subsystems the sync depends on
#[derive(Debug, Clone, Copy)]
pub struct SteamStatus {
    pub sessions: ServiceStatus,
    pub community: ServiceStatus,
}

impl SteamStatus {
    /// True if neither subsystem is offline
    pub fn is_online(&self) -> bool {
        self.sessions != ServiceStatus::Offline && self.community != ServiceStatus::Offline
    }

    /// True if either subsystem is delayed
    pub fn is_delayed(&self) -> bool {
        self.sessions == ServiceStatus::Delayed || self.community == ServiceStatus::Delayed
    }
}

impl std::fmt::Display for SteamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sessions: {}, community: {}", self.sessions, self.community)
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    result: StatusResult,
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    services: StatusServices,
}

#[derive(Debug, Deserialize)]
struct StatusServices {
    #[serde(rename = "SessionsLogon", default)]
    sessions_logon: String,
    #[serde(rename = "SteamCommunity", default)]
    steam_community: String,
}

/// One entry of the inventory listing. Only the fields the sync consumes;
/// everything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDescription {
    #[serde(default)]
    pub market_hash_name: String,
    #[serde(default)]
    pub tradable: u8,
    #[serde(default)]
    pub marketable: u8,
}

/// Inventory listing for a Steam user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryResponse {
    #[serde(default)]
    pub descriptions: Vec<ItemDescription>,
    #[serde(default)]
    pub total_inventory_count: u32,
}

/// Client for the Steam status and inventory endpoints
#[derive(Debug, Clone)]
pub struct SteamClient {
    http: reqwest::Client,
    api_base: String,
    community_base: String,
    api_key: String,
}

impl SteamClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_urls(api_key, DEFAULT_API_BASE, DEFAULT_COMMUNITY_BASE)
    }

    /// Construct against non-default base URLs (for testing with mock
    /// servers).
    pub fn with_base_urls(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        community_base: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            community_base: community_base.into(),
            api_key: api_key.into(),
        }
    }

    /// Query the CS2 game-server status endpoint
    pub async fn status(&self) -> Result<SteamStatus> {
        if self.api_key.trim().is_empty() {
            return Err(SyncError::Configuration("steam api key is empty".into()));
        }

        let url = format!(
            "{}/ICSGOServers_730/GetGameServersStatus/v1/",
            self.api_base
        );

        log::debug!("Querying Steam status");

        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status()));
        }

        let status: StatusResponse = response.json().await?;

        Ok(SteamStatus {
            sessions: ServiceStatus::parse(&status.result.services.sessions_logon),
            community: ServiceStatus::parse(&status.result.services.steam_community),
        })
    }

    /// Fetch the CS2 inventory of the given Steam user
    pub async fn inventory(&self, steam_id64: u64) -> Result<InventoryResponse> {
        let url = format!("{}/inventory/{}/730/2", self.community_base, steam_id64);

        log::debug!("Fetching inventory for user {}", steam_id64);

        let response = self
            .http
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
