//! The router: one ledger instance, one operation at a time
//!
//! Every mutating call runs against a draft copy of [`LedgerState`]. The draft
//! replaces the live state only when the operation and the invariant check
//! both succeed, so a failed call leaves no trace.

use crate::instructions::*;
use crate::invariants;
use crate::liquidation::*;
use crate::state::{AuctionKind, LedgerState};
use keel_auction::{DutchParams, LotId};
use keel_common::{Address, Context, Result, Role, Signature, Symbol};
use keel_oracle::{Secp256k1Verifier, Verifier};

pub struct Router<V = Secp256k1Verifier> {
    state: LedgerState,
    verifier: V,
}

impl<V: Verifier> Router<V> {
    pub fn new(
        admin: Address,
        vault: Address,
        stable_symbol: Symbol,
        governance_symbol: Symbol,
        verifier: V,
    ) -> Result<Self> {
        let state = LedgerState::new(admin, vault, stable_symbol, governance_symbol)?;
        Ok(Self { state, verifier })
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    fn transact<T>(
        &mut self,
        op: &str,
        f: impl FnOnce(&mut LedgerState, &V) -> Result<T>,
    ) -> Result<T> {
        let mut draft = self.state.clone();
        match f(&mut draft, &self.verifier).and_then(|out| invariants::check(&draft).map(|_| out)) {
            Ok(out) => {
                self.state = draft;
                Ok(out)
            }
            Err(e) => {
                log::debug!("{} rejected: {}", op, e);
                Err(e)
            }
        }
    }

    // CDP ledger

    pub fn produce_stablecoin(&mut self, ctx: &Context, collateral_amount: u128, min_ratio: u128, symbol: &Symbol) -> Result<u128> {
        self.transact("ProduceStablecoin", |s, _| {
            process_produce_stablecoin(s, ctx, collateral_amount, min_ratio, symbol)
        })
    }

    pub fn claim_extra_debt(&mut self, ctx: &Context, lot_id: LotId, symbol: &Symbol) -> Result<u128> {
        self.transact("ClaimExtraDebt", |s, _| process_claim_extra_debt(s, ctx, lot_id, symbol))
    }

    pub fn dispose_debt(&mut self, ctx: &Context, lot_id: LotId, symbol: &Symbol, payment: u128) -> Result<u128> {
        self.transact("DisposeDebt", |s, _| process_dispose_debt(s, ctx, lot_id, symbol, payment))
    }

    pub fn remove_collateral(&mut self, ctx: &Context, lot_id: LotId, amount: u128, symbol: &Symbol) -> Result<u128> {
        self.transact("RemoveCollateral", |s, _| {
            process_remove_collateral(s, ctx, lot_id, amount, symbol)
        })
    }

    // Collateral auction

    pub fn start_auction(&mut self, ctx: &Context, lot_id: LotId, requested_sale_amount: u128) -> Result<u128> {
        self.transact("StartAuction", |s, _| {
            process_start_auction(s, ctx, lot_id, requested_sale_amount)
        })
    }

    pub fn buy_lot(&mut self, ctx: &Context, lot_id: LotId, payment: u128) -> Result<SaleReceipt> {
        self.transact("BuyLot", |s, _| process_buy_lot(s, ctx, lot_id, payment))
    }

    pub fn cancel_auction(&mut self, ctx: &Context, lot_id: LotId) -> Result<()> {
        self.transact("CancelAuction", |s, _| process_cancel_auction(s, ctx, lot_id))
    }

    // Debt auction

    pub fn start_debt_auction(&mut self, ctx: &Context, amount: u128, symbol: &Symbol) -> Result<LotId> {
        self.transact("StartDebtAuction", |s, _| process_start_debt_auction(s, ctx, amount, symbol))
    }

    pub fn buy_debt_lot(&mut self, ctx: &Context, lot_id: LotId, payment: u128) -> Result<DebtSale> {
        self.transact("BuyDebtLot", |s, _| process_buy_debt_lot(s, ctx, lot_id, payment))
    }

    pub fn cancel_debt_lot(&mut self, ctx: &Context, lot_id: LotId) -> Result<()> {
        self.transact("CancelDebtLot", |s, _| process_cancel_debt_lot(s, ctx, lot_id))
    }

    pub fn restart_debt_lot(&mut self, ctx: &Context, lot_id: LotId, amount: u128) -> Result<u128> {
        self.transact("RestartDebtLot", |s, _| process_restart_debt_lot(s, ctx, lot_id, amount))
    }

    // Surplus auction

    pub fn start_surplus_auction(&mut self, ctx: &Context, amount: u128, symbol: &Symbol) -> Result<LotId> {
        self.transact("StartSurplusAuction", |s, _| {
            process_start_surplus_auction(s, ctx, amount, symbol)
        })
    }

    pub fn buy_surplus_lot(&mut self, ctx: &Context, lot_id: LotId, payment: u128) -> Result<SurplusSale> {
        self.transact("BuySurplusLot", |s, _| process_buy_surplus_lot(s, ctx, lot_id, payment))
    }

    pub fn cancel_surplus_lot(&mut self, ctx: &Context, lot_id: LotId) -> Result<()> {
        self.transact("CancelSurplusLot", |s, _| process_cancel_surplus_lot(s, ctx, lot_id))
    }

    pub fn restart_surplus_lot(&mut self, ctx: &Context, lot_id: LotId, amount: u128) -> Result<u128> {
        self.transact("RestartSurplusLot", |s, _| process_restart_surplus_lot(s, ctx, lot_id, amount))
    }

    // Admin

    pub fn set_token(&mut self, ctx: &Context, enabled: bool, symbol: &Symbol) -> Result<()> {
        self.transact("SetToken", |s, _| process_set_token(s, ctx, enabled, symbol))
    }

    pub fn set_fees(&mut self, ctx: &Context, fee_rate: u128, auction_fee_share: u128, fee_receiver: Address) -> Result<()> {
        self.transact("SetFees", |s, _| {
            process_set_fees(s, ctx, fee_rate, auction_fee_share, fee_receiver)
        })
    }

    pub fn set_auction_params(&mut self, ctx: &Context, kind: AuctionKind, params: DutchParams) -> Result<()> {
        self.transact("SetAuctionParams", |s, _| process_set_auction_params(s, ctx, kind, params))
    }

    pub fn set_liquidate_threshold(&mut self, ctx: &Context, threshold: u128) -> Result<()> {
        self.transact("SetLiquidateThreshold", |s, _| {
            process_set_liquidate_threshold(s, ctx, threshold)
        })
    }

    pub fn set_max_lot_amount_factor(&mut self, ctx: &Context, kind: AuctionKind, factor: u128) -> Result<()> {
        self.transact("SetMaxLotAmountFactor", |s, _| {
            process_set_max_lot_amount_factor(s, ctx, kind, factor)
        })
    }

    pub fn grant_role(&mut self, ctx: &Context, role: Role, account: Address) -> Result<()> {
        self.transact("GrantRole", |s, _| process_grant_role(s, ctx, role, account))
    }

    pub fn revoke_role(&mut self, ctx: &Context, role: Role, account: &Address) -> Result<()> {
        self.transact("RevokeRole", |s, _| process_revoke_role(s, ctx, role, account))
    }

    // Tokens

    pub fn approve(&mut self, ctx: &Context, symbol: &Symbol, spender: &Address, amount: u128) -> Result<()> {
        self.transact("Approve", |s, _| process_approve(s, ctx, symbol, spender, amount))
    }

    pub fn transfer(&mut self, ctx: &Context, symbol: &Symbol, to: &Address, amount: u128) -> Result<()> {
        self.transact("Transfer", |s, _| process_transfer(s, ctx, symbol, to, amount))
    }

    pub fn mint_token(&mut self, ctx: &Context, symbol: &Symbol, to: &Address, amount: u128) -> Result<()> {
        self.transact("MintToken", |s, _| process_mint_token(s, ctx, symbol, to, amount))
    }

    pub fn grant_token_role(&mut self, ctx: &Context, symbol: &Symbol, role: Role, account: Address) -> Result<()> {
        self.transact("GrantTokenRole", |s, _| {
            process_grant_token_role(s, ctx, symbol, role, account)
        })
    }

    // Oracle

    pub fn set_price(
        &mut self,
        ctx: &Context,
        nonce: u64,
        price: u128,
        signature: &Signature,
        symbol: &Symbol,
    ) -> Result<()> {
        self.transact("SetPrice", |s, v| {
            keel_oracle::process_set_price(&mut s.oracle, v, ctx, nonce, price, signature, symbol)
        })
    }

    pub fn update_token(&mut self, ctx: &Context, enabled: bool, symbol: &Symbol) -> Result<()> {
        self.transact("UpdateToken", |s, _| {
            keel_oracle::process_update_token(&mut s.oracle, ctx, enabled, symbol)
        })
    }

    pub fn set_valid_time(&mut self, ctx: &Context, seconds: u64) -> Result<()> {
        self.transact("SetValidTime", |s, _| {
            keel_oracle::process_set_valid_time(&mut s.oracle, ctx, seconds)
        })
    }

    pub fn grant_oracle_role(&mut self, ctx: &Context, role: Role, account: Address) -> Result<()> {
        self.transact("GrantOracleRole", |s, _| s.oracle.access.grant_role(&ctx.caller, role, account))
    }

    /// Decode and run a raw oracle instruction
    pub fn oracle_instruction(&mut self, ctx: &Context, data: &[u8]) -> Result<()> {
        self.transact("Oracle", |s, v| {
            keel_oracle::entrypoint::process_instruction(&mut s.oracle, v, ctx, data)
        })
    }
}
