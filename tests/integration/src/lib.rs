//! Keel Integration Tests
//!
//! Harness shared by the end-to-end scenarios and property tests: a router
//! with real secp256k1 signature recovery, one registered collateral and a
//! signer that publishes prices through the oracle.

pub use keel_auction;
pub use keel_common;
pub use keel_oracle;
pub use keel_router;

use keel_common::{Address, Context, FungibleAsset, Result, Role, Signature, Symbol, WAD};
use keel_oracle::{PriceSigner, Secp256k1Verifier};
use keel_router::Router;

pub const ADMIN: Address = Address::repeat_byte(0xA1);
pub const VAULT: Address = Address::repeat_byte(0xBB);
pub const ALICE: Address = Address::repeat_byte(0x01);
pub const BOB: Address = Address::repeat_byte(0x02);
pub const CAROL: Address = Address::repeat_byte(0x03);

/// Ledger time at which the harness starts
pub const GENESIS: u64 = 1_000_000;

/// Collateral every user is funded with
pub const FUNDED: u128 = 100 * WAD;

pub const SIGNER_KEY: [u8; 32] = [0x11; 32];

pub fn eth() -> Symbol {
    Symbol::from("ETH")
}

pub fn kusd() -> Symbol {
    Symbol::from("kUSD")
}

pub fn keel() -> Symbol {
    Symbol::from("KEEL")
}

pub struct Harness {
    pub router: Router<Secp256k1Verifier>,
    pub signer: PriceSigner,
    pub now: u64,
    nonce: u64,
}

impl Harness {
    /// ETH registered at 30, KEEL at 2; ALICE, BOB and CAROL hold 100 ETH
    /// each with the vault approved
    pub fn new() -> Result<Self> {
        let router = Router::new(ADMIN, VAULT, kusd(), keel(), Secp256k1Verifier::new())?;
        let signer = PriceSigner::from_bytes(&SIGNER_KEY)?;
        let mut harness = Self {
            router,
            signer,
            now: GENESIS,
            nonce: 0,
        };

        let admin = harness.ctx(ADMIN);
        let router = &mut harness.router;
        router.set_token(&admin, true, &eth())?;
        router.update_token(&admin, true, &eth())?;
        router.update_token(&admin, true, &keel())?;
        router.grant_oracle_role(&admin, Role::Validator, harness.signer.address())?;
        router.grant_token_role(&admin, &keel(), Role::Service, ADMIN)?;
        for user in [ALICE, BOB, CAROL] {
            router.mint_token(&admin, &eth(), &user, FUNDED)?;
            router.approve(&Context::new(user, harness.now), &eth(), &VAULT, u128::MAX)?;
        }

        harness.set_price(&eth(), 30 * WAD)?;
        harness.set_price(&keel(), 2 * WAD)?;
        Ok(harness)
    }

    pub fn ctx(&self, caller: Address) -> Context {
        Context::new(caller, self.now)
    }

    pub fn advance(&mut self, seconds: u64) {
        self.now += seconds;
    }

    /// Sign `price` under the next nonce without submitting it
    pub fn sign(&mut self, symbol: &Symbol, price: u128) -> (u64, Signature) {
        self.nonce += 1;
        (self.nonce, self.signer.sign_price(self.nonce, price, symbol))
    }

    /// Publish a signed price at the current time
    pub fn set_price(&mut self, symbol: &Symbol, price: u128) -> Result<()> {
        let (nonce, signature) = self.sign(symbol, price);
        let ctx = self.ctx(ADMIN);
        self.router.set_price(&ctx, nonce, price, &signature, symbol)
    }

    pub fn produce(&mut self, user: Address, collateral: u128, min_ratio: u128) -> Result<u128> {
        let ctx = self.ctx(user);
        self.router.produce_stablecoin(&ctx, collateral, min_ratio, &eth())
    }

    /// Governance tokens from the admin faucet
    pub fn faucet_governance(&mut self, to: Address, amount: u128) -> Result<()> {
        let ctx = self.ctx(ADMIN);
        self.router.mint_token(&ctx, &keel(), &to, amount)
    }

    pub fn balance(&self, symbol: &Symbol, account: &Address) -> u128 {
        self.router
            .state()
            .token(symbol)
            .map(|t| t.balance_of(account))
            .unwrap_or(0)
    }
}
