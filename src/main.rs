//! steamsync - CS2 inventory value tracker
//!
//! Prices a Steam user's CS2 inventory against market data on a schedule
//! and syncs quantities, prices and the total value to a spreadsheet.

use std::path::PathBuf;

use clap::Parser;
use steamsync::{Config, Engine, MarketClient, SheetsStore, SteamClient, SyncError};

/// CS2 inventory value tracker - syncs item prices and totals to a spreadsheet
#[derive(Parser, Debug)]
#[command(name = "steamsync")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "./.config.json")]
    config: String,

    /// Path to a filter policy file (default: marketable items only)
    #[arg(short, long)]
    filter: Option<String>,

    /// Path to a supplemental items file merged into every cycle
    #[arg(short, long)]
    items: Option<String>,

    /// Directory for rate-limit and run-tracking state files
    #[arg(short, long, default_value_t = default_state_dir())]
    state_dir: String,

    /// Run a single cycle and exit (default: run continuously)
    #[arg(long, default_value_t = false)]
    once: bool,
}

/// Returns the default state directory: ~/.local/share/steamsync
fn default_state_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("steamsync")
        .to_string_lossy()
        .to_string()
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let state_dir = PathBuf::from(&args.state_dir);

    log::info!("Starting steamsync...");
    log::info!("State directory: {}", state_dir.display());

    if !state_dir.exists() {
        if let Err(e) = std::fs::create_dir_all(&state_dir) {
            log::error!("Failed to create state directory: {}", e);
            std::process::exit(1);
        }
        log::info!("Created directory: {}", state_dir.display());
    }

    // Configuration problems are the only fatal startup condition; once the
    // engine loop is running, failures reschedule instead of exiting.
    let cfg = match Config::load(&PathBuf::from(&args.config)) {
        Ok(cfg) => {
            log::info!("Loaded config from {}", args.config);
            cfg
        }
        Err(e) => {
            log::error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let steam = SteamClient::new(cfg.steam_api_key.clone());
    let market = MarketClient::new();
    let store = SheetsStore::new(cfg.spreadsheet_id.clone(), cfg.sheets_api_token.clone());

    if let Err(e) = store.probe().await {
        log::error!("Spreadsheet connection test failed: {}", e);
        if matches!(e, SyncError::Configuration(_)) {
            std::process::exit(1);
        }
        // Transient store trouble is not fatal; the first cycle will
        // surface it again and reschedule.
        log::warn!("Continuing despite failed probe");
    }

    let engine = match Engine::new(cfg, steam, market, store, &state_dir) {
        Ok(engine) => engine
            .with_filter_file(args.filter.map(PathBuf::from))
            .with_items_file(args.items.map(PathBuf::from)),
        Err(e) => {
            log::error!("Failed to build engine: {}", e);
            std::process::exit(1);
        }
    };

    let cancel = engine.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, finishing current phase...");
            cancel.request();
        }
    });

    engine.run(args.once).await;

    log::info!("steamsync stopped");
}
