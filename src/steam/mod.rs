//! Steam provider: service status, inventory fetching and aggregation

pub mod client;
pub mod filter;

pub use client::{
    InventoryResponse, ItemDescription, ServiceStatus, SteamClient, SteamStatus,
};
pub use filter::{aggregate, merge_supplemental, FilterPolicy};
