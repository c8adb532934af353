//! Reconciliation engine
//!
//! One cycle walks the fixed phase order: budget check, inventory fetch,
//! price resolution, diff against the previously persisted total, write-back.
//! The engine then sleeps until the next deadline - the regular interval
//! after a success, a shorter retry delay after a failure - and goes again.
//! Exactly one deadline is ever pending and cycles never overlap.
//!
//! Spreadsheet writes are independent per range and deliberately not
//! transactional: a partial provider outage should damage as few cells as
//! possible. Failures are aggregated and reported; a failure on the error
//! marker cell itself gets one extra short-delay retry because that cell is
//! the operator's primary signal.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::format;
use crate::market::{resolve_prices, MarketClient, PriceOptions, PricedItem, Throttle};
use crate::ratelimit::RateLimiter;
use crate::runlog::RunLog;
use crate::sheets::{column_range, TabularStore};
use crate::steam::{aggregate, merge_supplemental, FilterPolicy, SteamClient};

/// Marker written to the error cell after a clean run
pub const NO_ERROR_MARKER: &str = "No error occurred.";

/// Advisory threshold for back-to-back manual runs
const RUN_SPACING_ADVISORY: chrono::Duration = chrono::Duration::minutes(1);

/// Requests one cycle needs from the Steam provider: status + inventory
const STEAM_REQUESTS_PER_CYCLE: u32 = 2;

/// The previously persisted run summary, read back at cycle start purely
/// as the baseline for the value delta.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub last_updated: Option<DateTime<Utc>>,
    pub last_error: String,
    pub total_value: f64,
}

/// Result of a single reconciliation cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Cycle succeeded; rerun after the regular interval
    Completed { next_run_in: Duration },
    /// Cycle failed; rerun after the retry delay
    Failed { reason: String, retry_in: Duration },
    /// Operator interrupt observed; do not rearm
    Cancelled,
}

/// Cooperative shutdown signal, checked between phases and at the sleep
/// point. Requests are honored after the current request resolves, never
/// mid-request.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation has been requested
    pub async fn requested(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_requested() {
                return;
            }
            notified.await;
        }
    }
}

/// The reconciliation engine. Generic over the tabular store so tests can
/// substitute an in-memory one.
pub struct Engine<S: TabularStore> {
    cfg: Config,
    steam: SteamClient,
    market: MarketClient,
    store: S,
    steam_limiter: RateLimiter,
    market_limiter: RateLimiter,
    run_log: RunLog,
    currency_sign: &'static str,
    filter_file: Option<PathBuf>,
    items_file: Option<PathBuf>,
    cancel: CancelFlag,
}

impl<S: TabularStore> Engine<S> {
    pub fn new(
        cfg: Config,
        steam: SteamClient,
        market: MarketClient,
        store: S,
        state_dir: &Path,
    ) -> Result<Self> {
        let currency_sign = format::currency_sign(&cfg.currency)?;

        let steam_limiter = RateLimiter::new(
            "steam",
            cfg.steam_requests_per_minute,
            chrono::Duration::minutes(1),
            state_dir.join(".steam_ratelimit.json"),
        );
        let market_limiter = RateLimiter::new(
            "market",
            cfg.market_requests_per_hour,
            chrono::Duration::hours(1),
            state_dir.join(".market_ratelimit.json"),
        );
        let run_log = RunLog::new(state_dir.join(".runlog.json"));

        Ok(Self {
            cfg,
            steam,
            market,
            store,
            steam_limiter,
            market_limiter,
            run_log,
            currency_sign,
            filter_file: None,
            items_file: None,
            cancel: CancelFlag::new(),
        })
    }

    /// Use a filter policy file instead of the default policy
    pub fn with_filter_file(mut self, path: Option<PathBuf>) -> Self {
        self.filter_file = path;
        self
    }

    /// Merge a supplemental items file into every cycle's aggregation
    pub fn with_items_file(mut self, path: Option<PathBuf>) -> Self {
        self.items_file = path;
        self
    }

    /// Handle for requesting shutdown from outside the engine
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_requested() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run cycles until cancelled. With `once`, a single cycle runs and the
    /// loop exits regardless of outcome.
    pub async fn run(&self, once: bool) {
        loop {
            let outcome = self.run_cycle().await;

            let delay = match outcome {
                CycleOutcome::Completed { next_run_in } => {
                    log::info!(
                        "Cycle completed, next run in {} hour(s)",
                        self.cfg.update_interval_hours
                    );
                    next_run_in
                }
                CycleOutcome::Failed { reason, retry_in } => {
                    log::error!(
                        "Cycle failed ({}), retrying in {} minute(s)",
                        reason,
                        self.cfg.retry_minutes
                    );
                    retry_in
                }
                CycleOutcome::Cancelled => {
                    log::info!("Shutdown requested, stopping");
                    break;
                }
            };

            if once {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.cancel.requested() => {
                    log::info!("Shutdown requested, stopping");
                    break;
                }
            }
        }
    }

    /// Execute one full reconciliation cycle
    pub async fn run_cycle(&self) -> CycleOutcome {
        match self.try_cycle().await {
            Ok(()) => CycleOutcome::Completed {
                next_run_in: Duration::from_secs(self.cfg.update_interval_hours * 3600),
            },
            Err(SyncError::Cancelled) => CycleOutcome::Cancelled,
            Err(e) => {
                let reason = e.to_string();
                log::error!("Cycle failed: {}", reason);
                self.record_failure_marker(&reason).await;
                CycleOutcome::Failed {
                    reason,
                    retry_in: Duration::from_secs(self.cfg.retry_minutes * 60),
                }
            }
        }
    }

    async fn try_cycle(&self) -> Result<()> {
        let now = Utc::now();
        if self.run_log.ran_recently(now, RUN_SPACING_ADVISORY) {
            log::warn!(
                "Last run was less than {} minute(s) ago, please refrain from spamming",
                RUN_SPACING_ADVISORY.num_minutes()
            );
        }

        // Budget check
        let mut steam_state = self.steam_limiter.load()?;
        if !self
            .steam_limiter
            .within_budget(&mut steam_state, STEAM_REQUESTS_PER_CYCLE)
        {
            return Err(self
                .steam_limiter
                .budget_error(&steam_state, STEAM_REQUESTS_PER_CYCLE));
        }
        self.check_cancelled()?;

        // Fetching. Limiter state is saved whether or not the batch
        // completed - calls already made count against the window.
        let fetched = self.fetch_inventory(&mut steam_state).await;
        self.steam_limiter.save(&steam_state)?;
        let inventory = fetched?;

        let policy = FilterPolicy::load(self.filter_file.as_deref())?;
        log::debug!("Filter policy: {}", policy);

        let amounts = aggregate(&inventory, &policy);
        let amounts = merge_supplemental(amounts, self.items_file.as_deref())?;
        log::info!("Aggregated {} distinct item(s)", amounts.len());

        self.check_cancelled()?;

        // Pricing
        if !self.market.is_available().await {
            return Err(SyncError::ProviderUnavailable {
                provider: "market",
                reason: "availability probe failed".into(),
            });
        }

        let options = PriceOptions {
            median_days: self.cfg.median_price_days,
            currency: self.cfg.currency.clone(),
        };
        let throttle = Throttle {
            pause_every: self.cfg.pricing_pause_every,
            pause: Duration::from_secs(self.cfg.pricing_pause_secs),
        };

        let mut market_state = self.market_limiter.load()?;
        let resolved = resolve_prices(
            &self.market,
            &amounts,
            &options,
            &self.market_limiter,
            &mut market_state,
            throttle,
        )
        .await;
        self.market_limiter.save(&market_state)?;
        let items = resolved?;

        log::info!("Resolved prices for {} item(s)", items.len());
        self.check_cancelled()?;

        // Diffing
        let snapshot = self.read_snapshot().await?;

        if !snapshot.last_error.is_empty() && snapshot.last_error != NO_ERROR_MARKER {
            log::warn!("Last run reported an error: {}", snapshot.last_error);
        }

        let cooldown = chrono::Duration::minutes(self.cfg.cooldown_minutes as i64);
        if let Some(last) = snapshot.last_updated {
            if Utc::now() - last < cooldown {
                log::warn!(
                    "Last update was less than {} minute(s) ago",
                    self.cfg.cooldown_minutes
                );
            }
        }

        let new_total: f64 = items.iter().map(|i| i.total_price()).sum();
        let delta = new_total - snapshot.total_value;
        log::info!(
            "Total value {:.2} (was {:.2}, delta {:+.2})",
            new_total,
            snapshot.total_value,
            delta
        );

        self.check_cancelled()?;

        // Writing
        self.write_results(&items, new_total, delta).await?;

        self.run_log.record(Utc::now())?;

        Ok(())
    }

    /// Status gate plus inventory fetch, recording limiter usage per call
    async fn fetch_inventory(
        &self,
        steam_state: &mut crate::ratelimit::RateLimitState,
    ) -> Result<crate::steam::InventoryResponse> {
        let status = self.steam.status().await?;
        self.steam_limiter.record(steam_state);
        log::debug!("Steam status: {}", status);

        if !status.is_online() {
            return Err(SyncError::ProviderUnavailable {
                provider: "steam",
                reason: format!("services offline ({})", status),
            });
        }
        if status.is_delayed() {
            log::warn!("Steam services are delayed, expect issues");
        }

        let inventory = self.steam.inventory(self.cfg.steam_user_id64).await?;
        self.steam_limiter.record(steam_state);
        log::info!(
            "Fetched inventory: {} description(s)",
            inventory.descriptions.len()
        );

        Ok(inventory)
    }

    /// Read the previously persisted run summary from the sheet
    pub async fn read_snapshot(&self) -> Result<RunSnapshot> {
        let last_updated_raw = self.store.read(&self.cfg.last_updated_cell).await?;
        let last_updated = match first_cell(&last_updated_raw) {
            Some(raw) if !raw.trim().is_empty() => Some(
                DateTime::parse_from_rfc3339(raw.trim())
                    .map_err(|e| SyncError::Store(format!("parsing last updated cell: {}", e)))?
                    .with_timezone(&Utc),
            ),
            _ => None,
        };

        let error_raw = self.store.read(&self.cfg.error_cell).await?;
        let last_error = first_cell(&error_raw).cloned().unwrap_or_default();

        let total_raw = self.store.read(&self.cfg.total_value_cell).await?;
        let total_value = match first_cell(&total_raw) {
            Some(raw) if !raw.trim().is_empty() => {
                format::parse_price(raw, &self.cfg.decimal_separator, self.currency_sign)?
            }
            _ => 0.0,
        };

        Ok(RunSnapshot {
            last_updated,
            last_error,
            total_value,
        })
    }

    /// Persist the cycle results as independent range writes.
    ///
    /// Every write is attempted even when an earlier one failed. Failures
    /// are aggregated into one error; a failed error-marker write gets one
    /// retry after a short, distinct delay before it is escalated.
    async fn write_results(&self, items: &[PricedItem], new_total: f64, delta: f64) -> Result<()> {
        let cfg = &self.cfg;
        let sep = &cfg.decimal_separator;
        let sign = self.currency_sign;

        let mut failures: Vec<String> = Vec::new();

        if !items.is_empty() {
            let start = cfg.starting_row;
            let end = start + items.len() as u32 - 1;

            let names = items
                .iter()
                .map(|i| vec![i.market_hash_name.clone()])
                .collect();
            self.attempt_write(&column_range(&cfg.item_column, start, end), names, &mut failures)
                .await;

            let amounts = items.iter().map(|i| vec![i.amount.to_string()]).collect();
            self.attempt_write(
                &column_range(&cfg.amount_column, start, end),
                amounts,
                &mut failures,
            )
            .await;

            let unit_prices = items
                .iter()
                .map(|i| vec![format::format_price(i.unit_price, sep, sign)])
                .collect();
            self.attempt_write(
                &column_range(&cfg.single_price_column, start, end),
                unit_prices,
                &mut failures,
            )
            .await;

            let total_prices = items
                .iter()
                .map(|i| vec![format::format_price(i.total_price(), sep, sign)])
                .collect();
            self.attempt_write(
                &column_range(&cfg.total_price_column, start, end),
                total_prices,
                &mut failures,
            )
            .await;
        }

        self.attempt_write(
            &cfg.total_value_cell,
            vec![vec![format::format_price(new_total, sep, sign)]],
            &mut failures,
        )
        .await;

        self.attempt_write(
            &cfg.difference_cell,
            vec![vec![format::format_price(delta, sep, sign)]],
            &mut failures,
        )
        .await;

        self.write_marker_with_retry(NO_ERROR_MARKER, &mut failures)
            .await;

        self.attempt_write(
            &cfg.last_updated_cell,
            vec![vec![Utc::now().to_rfc3339()]],
            &mut failures,
        )
        .await;

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Store(failures.join("; ")))
        }
    }

    async fn attempt_write(
        &self,
        range: &str,
        values: Vec<Vec<String>>,
        failures: &mut Vec<String>,
    ) {
        if let Err(e) = self.store.write(range, values).await {
            log::error!("Write to {} failed: {}", range, e);
            failures.push(e.to_string());
        }
    }

    /// Write the error/status marker cell, retrying once after the
    /// configured short delay. The marker is the operator's primary
    /// signal, so its failure is escalated in the aggregate.
    async fn write_marker_with_retry(&self, marker: &str, failures: &mut Vec<String>) {
        let range = &self.cfg.error_cell;
        let values = vec![vec![marker.to_string()]];

        if self.store.write(range, values.clone()).await.is_ok() {
            return;
        }

        log::warn!(
            "Writing status marker failed, retrying in {}s",
            self.cfg.marker_retry_secs
        );
        tokio::time::sleep(Duration::from_secs(self.cfg.marker_retry_secs)).await;

        if let Err(e) = self.store.write(range, values).await {
            log::error!("Writing status marker failed on retry: {}", e);
            failures.push(format!("status marker write failed twice: {}", e));
        }
    }

    /// Best-effort recording of a failure reason into the marker cell
    async fn record_failure_marker(&self, reason: &str) {
        let mut failures = Vec::new();
        self.write_marker_with_retry(reason, &mut failures).await;
        if !failures.is_empty() {
            log::error!("Could not record failure on the sheet: {}", failures.join("; "));
        }
    }
}

fn first_cell(values: &[Vec<String>]) -> Option<&String> {
    values.first().and_then(|row| row.first())
}
