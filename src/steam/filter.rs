//! Inventory filtering and aggregation
//!
//! Raw inventory listings repeat a description per owned copy. Filtering
//! drops entries the operator does not want counted, aggregation collapses
//! the rest into a market-name -> quantity map, and an optional items file
//! adds quantities for items held outside the inventory (storage units,
//! trades in flight).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SyncError};
use crate::steam::client::InventoryResponse;

/// Which flags an inventory entry must carry to be counted
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct FilterPolicy {
    #[serde(default)]
    pub tradable: bool,
    #[serde(default)]
    pub marketable: bool,
}

impl Default for FilterPolicy {
    /// Marketability required, tradability not. Items on a trade hold are
    /// still worth money.
    fn default() -> Self {
        Self {
            tradable: false,
            marketable: true,
        }
    }
}

impl std::fmt::Display for FilterPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tradable: {}, marketable: {}",
            self.tradable, self.marketable
        )
    }
}

impl FilterPolicy {
    /// Load a policy file, or the default policy when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => return Ok(Self::default()),
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Configuration(format!("opening filter file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| SyncError::Configuration(format!("decoding filter file: {}", e)))
    }
}

/// Count owned quantities per market hash name, applying the filter policy
/// to every raw entry first. Input order has no effect on the result.
pub fn aggregate(inv: &InventoryResponse, policy: &FilterPolicy) -> HashMap<String, u32> {
    let mut amounts = HashMap::new();

    for item in &inv.descriptions {
        if policy.tradable && item.tradable == 0 {
            continue;
        }
        if policy.marketable && item.marketable == 0 {
            continue;
        }
        *amounts.entry(item.market_hash_name.clone()).or_insert(0) += 1;
    }

    amounts
}

#[derive(Debug, Deserialize)]
struct ItemFile {
    items: Vec<SupplementalItem>,
}

#[derive(Debug, Deserialize)]
struct SupplementalItem {
    market_hash_name: String,
    amount: u32,
}

/// Merge quantities from a supplemental items file into the aggregated map.
///
/// Existing keys add, new keys insert. No path is a no-op; a path that
/// cannot be read or parsed is a configuration error. Merging the same
/// file twice accumulates - deliberately not idempotent.
pub fn merge_supplemental(
    mut amounts: HashMap<String, u32>,
    path: Option<&Path>,
) -> Result<HashMap<String, u32>> {
    let path = match path {
        Some(p) => p,
        None => return Ok(amounts),
    };

    let content = std::fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!("opening items file {}: {}", path.display(), e))
    })?;

    let file: ItemFile = serde_json::from_str(&content)
        .map_err(|e| SyncError::Configuration(format!("decoding items file: {}", e)))?;

    for item in file.items {
        *amounts.entry(item.market_hash_name).or_insert(0) += item.amount;
    }

    Ok(amounts)
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
