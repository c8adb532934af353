//! Market price provider: per-item price queries and batch resolution

pub mod client;
pub mod resolver;

pub use client::{MarketClient, PriceOptions, PriceOutcome};
pub use resolver::{resolve_prices, PricedItem, Throttle};
