//! The single ledger-state struct every operation mutates

use super::params::{AuctionKind, CollateralAuctionParams, ProtocolAuctionParams, RouterParams};
use super::position::Position;
use keel_auction::LotBook;
use keel_common::{checked_add, checked_sub, AccessControl, Address, LedgerError, Result, Role, Symbol, TokenLedger};
use keel_oracle::{get_price, PriceOracle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Protocol-level running sums
///
/// Updated in the same operation as the position or lot they mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregates {
    /// Locked collateral per symbol
    pub total_collateral: BTreeMap<Symbol, u128>,
    pub total_debt: u128,
    /// Collateral currently offered in auction windows, per symbol
    pub total_auctioned: BTreeMap<Symbol, u128>,
    /// Stablecoin held by the vault from over-covering liquidations
    pub surplus: u128,
    /// Surplus reserved by open surplus lots
    pub surplus_auctioned: u128,
    /// Debt left behind by positions liquidated to zero collateral
    pub bad_debt: u128,
    /// Bad debt reserved by open debt lots
    pub debt_auctioned: u128,
    /// Withdrawal fees retained for the auction side, per symbol
    ///
    /// Collateral kept in the vault with no claimant: no operation spends it,
    /// and vault solvency counts it on top of locked collateral.
    pub fee_pool: BTreeMap<Symbol, u128>,
}

impl Aggregates {
    pub fn total_collateral(&self, symbol: &Symbol) -> u128 {
        self.total_collateral.get(symbol).copied().unwrap_or(0)
    }

    pub fn total_auctioned(&self, symbol: &Symbol) -> u128 {
        self.total_auctioned.get(symbol).copied().unwrap_or(0)
    }

    pub fn fee_pool(&self, symbol: &Symbol) -> u128 {
        self.fee_pool.get(symbol).copied().unwrap_or(0)
    }

    pub(crate) fn add_to(map: &mut BTreeMap<Symbol, u128>, symbol: &Symbol, amount: u128) -> Result<()> {
        let entry = map.entry(symbol.clone()).or_insert(0);
        *entry = checked_add(*entry, amount)?;
        Ok(())
    }

    pub(crate) fn sub_from(map: &mut BTreeMap<Symbol, u128>, symbol: &Symbol, amount: u128) -> Result<()> {
        let entry = map.entry(symbol.clone()).or_insert(0);
        *entry = checked_sub(*entry, amount)?;
        Ok(())
    }
}

/// Registered collateral asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralAsset {
    pub token: TokenLedger,
    /// New positions may only be opened while enabled
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub params: RouterParams,
    pub collateral_auction: CollateralAuctionParams,
    pub debt_auction: ProtocolAuctionParams,
    pub surplus_auction: ProtocolAuctionParams,
    pub access: AccessControl,
    pub oracle: PriceOracle,
    pub stablecoin: TokenLedger,
    pub governance: TokenLedger,
    pub collaterals: BTreeMap<Symbol, CollateralAsset>,
    pub positions: BTreeMap<(Address, Symbol), Position>,
    pub collateral_lots: LotBook,
    pub debt_lots: LotBook,
    pub surplus_lots: LotBook,
    pub totals: Aggregates,
}

impl LedgerState {
    /// Fresh ledger administered by `admin`, holding funds under `vault`
    ///
    /// The vault receives the Service role on the stablecoin and governance
    /// token so the router can mint and burn them.
    pub fn new(admin: Address, vault: Address, stable_symbol: Symbol, governance_symbol: Symbol) -> Result<Self> {
        if admin.is_zero() || vault.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if stable_symbol == governance_symbol {
            return Err(LedgerError::SymbolMismatch);
        }

        let mut stablecoin = TokenLedger::new(stable_symbol.clone(), admin);
        stablecoin.access_mut().grant_role(&admin, Role::Service, vault)?;
        let mut governance = TokenLedger::new(governance_symbol.clone(), admin);
        governance.access_mut().grant_role(&admin, Role::Service, vault)?;

        Ok(Self {
            params: RouterParams::new(vault, stable_symbol, governance_symbol, admin),
            collateral_auction: CollateralAuctionParams::default(),
            debt_auction: ProtocolAuctionParams::default(),
            surplus_auction: ProtocolAuctionParams::default(),
            access: AccessControl::new(admin),
            oracle: PriceOracle::new(admin),
            stablecoin,
            governance,
            collaterals: BTreeMap::new(),
            positions: BTreeMap::new(),
            collateral_lots: LotBook::new(),
            debt_lots: LotBook::new(),
            surplus_lots: LotBook::new(),
            totals: Aggregates::default(),
        })
    }

    pub fn vault(&self) -> Address {
        self.params.vault
    }

    /// Fresh oracle price for `symbol` at `now`
    pub fn price(&self, symbol: &Symbol, now: u64) -> Result<u128> {
        get_price(&self.oracle, symbol, now)
    }

    pub fn collateral(&self, symbol: &Symbol) -> Result<&CollateralAsset> {
        self.collaterals
            .get(symbol)
            .ok_or_else(|| LedgerError::UnknownToken(symbol.to_string()))
    }

    pub fn collateral_token_mut(&mut self, symbol: &Symbol) -> Result<&mut TokenLedger> {
        self.collaterals
            .get_mut(symbol)
            .map(|asset| &mut asset.token)
            .ok_or_else(|| LedgerError::UnknownToken(symbol.to_string()))
    }

    /// Any ledger the router knows: stablecoin, governance or collateral
    pub fn token(&self, symbol: &Symbol) -> Result<&TokenLedger> {
        if *symbol == self.params.stable_symbol {
            Ok(&self.stablecoin)
        } else if *symbol == self.params.governance_symbol {
            Ok(&self.governance)
        } else {
            self.collateral(symbol).map(|asset| &asset.token)
        }
    }

    pub fn token_mut(&mut self, symbol: &Symbol) -> Result<&mut TokenLedger> {
        if *symbol == self.params.stable_symbol {
            Ok(&mut self.stablecoin)
        } else if *symbol == self.params.governance_symbol {
            Ok(&mut self.governance)
        } else {
            self.collateral_token_mut(symbol)
        }
    }

    pub fn position(&self, owner: &Address, symbol: &Symbol) -> Option<&Position> {
        self.positions.get(&(*owner, symbol.clone()))
    }

    pub fn position_mut(&mut self, owner: &Address, symbol: &Symbol) -> Result<&mut Position> {
        self.positions
            .get_mut(&(*owner, symbol.clone()))
            .ok_or(LedgerError::PositionNotFound)
    }

    pub fn lots(&self, kind: AuctionKind) -> &LotBook {
        match kind {
            AuctionKind::Collateral => &self.collateral_lots,
            AuctionKind::Debt => &self.debt_lots,
            AuctionKind::Surplus => &self.surplus_lots,
        }
    }

    pub fn dutch_params(&self, kind: AuctionKind) -> &keel_auction::DutchParams {
        match kind {
            AuctionKind::Collateral => &self.collateral_auction.dutch,
            AuctionKind::Debt => &self.debt_auction.dutch,
            AuctionKind::Surplus => &self.surplus_auction.dutch,
        }
    }

    pub(crate) fn dutch_params_mut(&mut self, kind: AuctionKind) -> &mut keel_auction::DutchParams {
        match kind {
            AuctionKind::Collateral => &mut self.collateral_auction.dutch,
            AuctionKind::Debt => &mut self.debt_auction.dutch,
            AuctionKind::Surplus => &mut self.surplus_auction.dutch,
        }
    }
}
