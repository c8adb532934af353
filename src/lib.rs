//! steamsync - CS2 inventory value tracker
//!
//! Periodically prices a Steam user's CS2 inventory against market data and
//! syncs item quantities, prices and the total value to a spreadsheet.
//! Request budgets per provider are tracked in local state files so they
//! survive restarts.

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod market;
pub mod ratelimit;
pub mod runlog;
pub mod sheets;
pub mod steam;

// Re-export commonly used items
pub use config::Config;
pub use engine::{CycleOutcome, Engine, RunSnapshot, NO_ERROR_MARKER};
pub use error::{Result, SyncError};
pub use market::{MarketClient, PriceOptions, PriceOutcome, PricedItem};
pub use ratelimit::{RateLimitState, RateLimiter};
pub use sheets::{SheetsStore, TabularStore};
pub use steam::{FilterPolicy, InventoryResponse, SteamClient, SteamStatus};
