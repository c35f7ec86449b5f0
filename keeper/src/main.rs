//! Keel Liquidation Keeper
//!
//! Watches position health, puts unhealthy lots up for auction and bids on
//! collateral, debt and surplus lots once their Dutch price decays below
//! fair value. Runs against an in-process devnet that replays a signed
//! price path, one price per tick.

mod config;
mod devnet;
mod health;
mod liquidator;
mod priority_queue;
mod tx_builder;

use anyhow::{Context, Result};
use config::Config;
use devnet::Devnet;
use keel_common::format_wad;
use liquidator::Keeper;
use std::time::Duration;
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // `keel-keeper init <path>` writes the default config and exits
    let args: Vec<String> = std::env::args().collect();
    if args.len() == 3 && args[1] == "init" {
        return Config::write_default(&args[2]);
    }

    log::info!("Starting Keel Liquidation Keeper");

    // Load configuration
    let config = Config::load().unwrap_or_else(|_| {
        log::warn!("Failed to load config, using default devnet config");
        Config::default_devnet()
    });

    let prices = config.prices()?;
    let (mut devnet, keeper_address) = Devnet::bootstrap(&config)?;
    log::info!("Keeper account: {}", keeper_address);

    let mut keeper = Keeper::new(keeper_address, config.min_profit_bps, config.max_actions_per_tick);

    log::info!("Keeper service started. Replaying {} ticks...", config.total_ticks());

    // Main event loop
    let mut interval = time::interval(Duration::from_millis(config.poll_interval_ms));

    for tick in 0..config.total_ticks() {
        interval.tick().await;

        if tick > 0 {
            devnet.advance(config.tick_seconds);
        }
        let price = prices[(tick as usize).min(prices.len() - 1)];
        if let Err(e) = devnet.publish_prices(price) {
            log::error!("Error publishing price {}: {}", format_wad(price), e);
        }

        keeper.run_pass(&mut devnet.router, devnet.now);

        if let Some(worst) = keeper.queue().peek() {
            log::debug!("Worst lot {} at ratio {}", worst.lot, format_wad(worst.ratio));
        }
    }

    let totals = devnet.router.aggregates();
    log::info!(
        "Done: debt={} bad_debt={} surplus={}",
        format_wad(totals.total_debt),
        format_wad(totals.bad_debt),
        format_wad(totals.surplus)
    );

    if let Some(path) = &config.snapshot_path {
        let path = shellexpand::tilde(path).into_owned();
        let json = serde_json::to_string_pretty(totals).context("Failed to serialize aggregates")?;
        std::fs::write(&path, json).context(format!("Failed to write snapshot to {}", path))?;
        log::info!("Wrote aggregates to {}", path);
    }

    Ok(())
}
