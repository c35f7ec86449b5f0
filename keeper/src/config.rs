//! Keeper configuration

use anyhow::{Context, Result};
use keel_common::{parse_wad, Address, Symbol};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid decimal for {field}: {value:?}")]
    InvalidDecimal { field: &'static str, value: String },
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    #[error("invalid signer key")]
    InvalidSignerKey,
    #[error("price path is empty")]
    EmptyPricePath,
}

/// Simulated borrower opened at start-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowerConfig {
    pub address: String,
    /// Collateral locked (decimal)
    pub collateral: String,
    /// Requested ratio (decimal, e.g. "1.5")
    pub min_ratio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Wall-clock delay between ticks in milliseconds
    pub poll_interval_ms: u64,

    /// Ledger seconds that pass per tick
    pub tick_seconds: u64,

    /// Ticks to run; 0 replays the price path once
    pub ticks: u64,

    /// Keeper account
    pub keeper_address: String,

    /// Hex secret key of the oracle price signer
    pub signer_key: String,

    pub collateral_symbol: String,
    pub stable_symbol: String,
    pub governance_symbol: String,

    /// Collateral prices published one per tick (decimal), last one repeats
    pub price_path: Vec<String>,

    /// Governance token price (decimal)
    pub governance_price: String,

    /// Required discount of auction cost below oracle value
    pub min_profit_bps: u64,

    /// Maximum keeper submissions per tick
    pub max_actions_per_tick: usize,

    /// Collateral the keeper locks to fund its stablecoin (decimal)
    pub keeper_collateral: String,

    pub borrowers: Vec<BorrowerConfig>,

    /// Where to write the final aggregates as JSON
    pub snapshot_path: Option<String>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("KEEPER_CONFIG")
            .unwrap_or_else(|_| "keeper-config.toml".to_string());
        let config_path = shellexpand::tilde(&config_path).into_owned();

        let config_str = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {}", config_path))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Default devnet simulation: one healthy and one fragile borrower, and
    /// a collateral price that slides from 30 to 0.97
    pub fn default_devnet() -> Self {
        Self {
            poll_interval_ms: 250,
            tick_seconds: 600,
            ticks: 0,
            keeper_address: format!("0x{}", "6b".repeat(20)),
            signer_key: "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".to_string(),
            collateral_symbol: "ETH".to_string(),
            stable_symbol: "kUSD".to_string(),
            governance_symbol: "KEEL".to_string(),
            price_path: ["30", "28", "25", "23", "20", "12", "0.97"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            governance_price: "2".to_string(),
            min_profit_bps: 500, // 5% below oracle value
            max_actions_per_tick: 8,
            keeper_collateral: "50".to_string(),
            borrowers: vec![
                BorrowerConfig {
                    address: format!("0x{}", "01".repeat(20)),
                    collateral: "1".to_string(),
                    min_ratio: "1.5".to_string(),
                },
                BorrowerConfig {
                    address: format!("0x{}", "02".repeat(20)),
                    collateral: "4".to_string(),
                    min_ratio: "3".to_string(),
                },
            ],
            snapshot_path: None,
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_devnet();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }

    pub fn keeper(&self) -> Result<Address, ConfigError> {
        parse_address(&self.keeper_address)
    }

    pub fn signer_secret(&self) -> Result<Vec<u8>, ConfigError> {
        let key = self.signer_key.strip_prefix("0x").unwrap_or(&self.signer_key);
        let bytes = hex::decode(key).map_err(|_| ConfigError::InvalidSignerKey)?;
        if bytes.len() != 32 {
            return Err(ConfigError::InvalidSignerKey);
        }
        Ok(bytes)
    }

    pub fn prices(&self) -> Result<Vec<u128>, ConfigError> {
        if self.price_path.is_empty() {
            return Err(ConfigError::EmptyPricePath);
        }
        self.price_path
            .iter()
            .map(|p| decimal("price_path", p))
            .collect()
    }

    pub fn governance_price_wad(&self) -> Result<u128, ConfigError> {
        decimal("governance_price", &self.governance_price)
    }

    pub fn keeper_collateral_wad(&self) -> Result<u128, ConfigError> {
        decimal("keeper_collateral", &self.keeper_collateral)
    }

    pub fn symbols(&self) -> (Symbol, Symbol, Symbol) {
        (
            Symbol::new(self.collateral_symbol.as_str()),
            Symbol::new(self.stable_symbol.as_str()),
            Symbol::new(self.governance_symbol.as_str()),
        )
    }

    /// Number of ticks the simulation runs
    pub fn total_ticks(&self) -> u64 {
        if self.ticks == 0 {
            self.price_path.len() as u64
        } else {
            self.ticks
        }
    }
}

impl BorrowerConfig {
    pub fn parse(&self) -> Result<(Address, u128, u128), ConfigError> {
        Ok((
            parse_address(&self.address)?,
            decimal("collateral", &self.collateral)?,
            decimal("min_ratio", &self.min_ratio)?,
        ))
    }
}

fn parse_address(value: &str) -> Result<Address, ConfigError> {
    Address::from_hex(value).ok_or_else(|| ConfigError::InvalidAddress(value.to_string()))
}

fn decimal(field: &'static str, value: &str) -> Result<u128, ConfigError> {
    parse_wad(value).map_err(|_| ConfigError::InvalidDecimal {
        field,
        value: value.to_string(),
    })
}
