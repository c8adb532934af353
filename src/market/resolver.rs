//! Budget-gated batch price resolution
//!
//! Resolves a price for every aggregated item, sequentially and in sorted
//! key order so the write-back is deterministic. The whole batch is
//! admitted against the market rate limiter up front; individual
//! "no price available" answers are absorbed, anything else aborts.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;
use crate::market::client::{MarketClient, PriceOptions, PriceOutcome};
use crate::ratelimit::{RateLimitState, RateLimiter};

/// An aggregated item with its resolved unit price
#[derive(Debug, Clone, PartialEq)]
pub struct PricedItem {
    pub market_hash_name: String,
    pub amount: u32,
    pub unit_price: f64,
    pub outcome: PriceOutcome,
}

impl PricedItem {
    /// Extended price: unit price times owned quantity
    pub fn total_price(&self) -> f64 {
        self.unit_price * self.amount as f64
    }
}

/// Soft throttle applied inside the pricing batch, independent of the
/// hard budget check: after every `pause_every` requests, sleep `pause`.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    pub pause_every: u32,
    pub pause: Duration,
}

/// Resolve prices for every aggregated item.
///
/// Fails fast with a budget error before any request is sent when the
/// batch would not fit the limiter's window. The limiter state is updated
/// in place after every request so the caller can persist it whether or
/// not the batch completed.
pub async fn resolve_prices(
    client: &MarketClient,
    amounts: &HashMap<String, u32>,
    options: &PriceOptions,
    limiter: &RateLimiter,
    state: &mut RateLimitState,
    throttle: Throttle,
) -> Result<Vec<PricedItem>> {
    if !limiter.within_budget(state, amounts.len() as u32) {
        return Err(limiter.budget_error(state, amounts.len() as u32));
    }

    let mut names: Vec<&String> = amounts.keys().collect();
    names.sort();

    let mut items = Vec::with_capacity(names.len());
    let mut since_pause = 0u32;

    for name in names {
        let (unit_price, outcome) = client.item_price(name, options).await?;
        limiter.record(state);

        if outcome == PriceOutcome::NoPriceAvailable {
            log::warn!("Item currently has no price: {}", name);
        }

        items.push(PricedItem {
            market_hash_name: name.clone(),
            amount: amounts[name],
            unit_price,
            outcome,
        });

        since_pause += 1;
        if throttle.pause_every > 0 && since_pause >= throttle.pause_every {
            since_pause = 0;
            log::info!(
                "Pausing {}s after {} price requests",
                throttle.pause.as_secs(),
                throttle.pause_every
            );
            tokio::time::sleep(throttle.pause).await;
        }
    }

    Ok(items)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
