//! Shared unit-test fixture

use crate::instructions::process_set_token;
use crate::state::LedgerState;
use keel_common::{Address, Context, FungibleAsset, Symbol, WAD};

pub const ADMIN: Address = Address::repeat_byte(0xA1);
pub const VAULT: Address = Address::repeat_byte(0xBB);
pub const ALICE: Address = Address::repeat_byte(0x01);
pub const BOB: Address = Address::repeat_byte(0x02);

/// Collateral each user starts with
pub const FUNDED: u128 = 100 * WAD;

pub fn eth() -> Symbol {
    Symbol::from("ETH")
}

pub fn keel() -> Symbol {
    Symbol::from("KEEL")
}

pub fn kusd() -> Symbol {
    Symbol::from("kUSD")
}

pub fn ctx(caller: Address, now: u64) -> Context {
    Context::new(caller, now)
}

/// Overwrite the oracle record directly, bypassing signatures
pub fn set_price(state: &mut LedgerState, symbol: &Symbol, price: u128, now: u64) {
    state
        .oracle
        .records
        .entry(symbol.clone())
        .or_insert_with(|| keel_oracle::PriceRecord::new(symbol.clone()))
        .enabled = true;
    state
        .oracle
        .records
        .get_mut(symbol)
        .unwrap()
        .update_price(price, now);
}

/// ETH registered at 30, KEEL at 2, ALICE and BOB funded and approved
pub fn setup() -> LedgerState {
    let mut state = LedgerState::new(ADMIN, VAULT, kusd(), keel()).unwrap();
    process_set_token(&mut state, &ctx(ADMIN, 0), true, &eth()).unwrap();
    set_price(&mut state, &eth(), 30 * WAD, 0);
    set_price(&mut state, &keel(), 2 * WAD, 0);

    for user in [ALICE, BOB] {
        let token = state.collateral_token_mut(&eth()).unwrap();
        token.mint(&ADMIN, &user, FUNDED).unwrap();
        token.approve(&user, &VAULT, u128::MAX).unwrap();
    }
    state
}
