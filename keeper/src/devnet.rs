//! In-process devnet: a router seeded with borrowers and a signed price feed

use crate::config::Config;
use crate::tx_builder;
use anyhow::{Context as _, Result};
use keel_common::{Address, Context, LedgerError, Role, Symbol, WAD};
use keel_oracle::{PriceSigner, Secp256k1Verifier};
use keel_router::{process_instruction, Router};

pub const ADMIN: Address = Address::repeat_byte(0xA1);
pub const VAULT: Address = Address::repeat_byte(0xBB);

/// Ledger time of the first tick
pub const GENESIS: u64 = 1_000_000;

/// Ratio the keeper borrows its working stablecoin at
pub const KEEPER_RATIO: u128 = 5 * WAD;

/// Governance tokens granted to the keeper for surplus auctions
pub const KEEPER_GOVERNANCE: u128 = 100 * WAD;

pub struct Devnet {
    pub router: Router<Secp256k1Verifier>,
    pub now: u64,
    pub collateral: Symbol,
    pub governance: Symbol,
    signer: PriceSigner,
    governance_price: u128,
    nonce: u64,
}

impl Devnet {
    /// Build the ledger, fund and approve every account, publish the first
    /// price and open the configured positions
    pub fn bootstrap(config: &Config) -> Result<(Self, Address)> {
        let (collateral, stable, governance) = config.symbols();
        let keeper = config.keeper()?;
        let prices = config.prices()?;
        let signer = PriceSigner::from_bytes(&config.signer_secret()?)
            .context("Failed to load price signer")?;

        let router = Router::new(ADMIN, VAULT, stable, governance.clone(), Secp256k1Verifier::new())
            .context("Failed to create router")?;

        let mut devnet = Self {
            router,
            now: GENESIS,
            collateral,
            governance,
            signer,
            governance_price: config.governance_price_wad()?,
            nonce: 0,
        };

        let admin = Context::new(ADMIN, GENESIS);
        let router = &mut devnet.router;
        router.set_token(&admin, true, &devnet.collateral)?;
        router.update_token(&admin, true, &devnet.collateral)?;
        router.update_token(&admin, true, &devnet.governance)?;
        router.grant_oracle_role(&admin, Role::Validator, devnet.signer.address())?;
        router.grant_token_role(&admin, &devnet.governance, Role::Service, ADMIN)?;
        router.mint_token(&admin, &devnet.governance, &keeper, KEEPER_GOVERNANCE)?;
        log::info!("Devnet: price signer {}", devnet.signer.address());

        devnet.publish_prices(prices[0])?;

        let mut accounts = Vec::with_capacity(config.borrowers.len() + 1);
        for borrower in &config.borrowers {
            accounts.push(borrower.parse()?);
        }
        accounts.push((keeper, config.keeper_collateral_wad()?, KEEPER_RATIO));

        for (account, collateral, ratio) in accounts {
            devnet.fund(account, collateral)?;
            devnet
                .submit(account, &tx_builder::build_produce_stablecoin(collateral, ratio, &devnet.collateral))
                .with_context(|| format!("Failed to open position for {}", account))?;
        }

        Ok((devnet, keeper))
    }

    /// Mint collateral to `account` and approve the vault
    fn fund(&mut self, account: Address, amount: u128) -> Result<(), LedgerError> {
        let admin = Context::new(ADMIN, self.now);
        self.router.mint_token(&admin, &self.collateral, &account, amount)?;
        self.submit(account, &tx_builder::build_approve(&self.collateral, &VAULT, u128::MAX))
    }

    pub fn submit(&mut self, caller: Address, data: &[u8]) -> Result<(), LedgerError> {
        process_instruction(&mut self.router, &Context::new(caller, self.now), data)
    }

    /// Sign and submit the collateral and governance prices at the current time
    pub fn publish_prices(&mut self, collateral_price: u128) -> Result<(), LedgerError> {
        let updates = [
            (self.collateral.clone(), collateral_price),
            (self.governance.clone(), self.governance_price),
        ];
        for (symbol, price) in updates {
            self.nonce += 1;
            let signature = self.signer.sign_price(self.nonce, price, &symbol);
            let data = tx_builder::build_set_price(self.nonce, price, &signature, &symbol);
            // any account may relay a signed price
            self.submit(ADMIN, &data)?;
        }
        Ok(())
    }

    pub fn advance(&mut self, seconds: u64) {
        self.now += seconds;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use keel_router::AuctionKind;

    pub(crate) fn fixture() -> (Devnet, Address) {
        Devnet::bootstrap(&Config::default_devnet()).unwrap()
    }

    #[test]
    fn test_bootstrap_opens_positions() {
        let (devnet, keeper) = fixture();
        let eth = Symbol::from("ETH");
        let kusd = Symbol::from("kUSD");

        assert_eq!(devnet.router.total_collateral(&eth), 55 * WAD);
        // 20 + 40 + 300
        assert_eq!(devnet.router.total_debt(), 360 * WAD);
        assert_eq!(devnet.router.balance_of(&kusd, &keeper).unwrap(), 300 * WAD);
        assert_eq!(
            devnet.router.balance_of(&devnet.governance, &keeper).unwrap(),
            KEEPER_GOVERNANCE
        );
        assert_eq!(devnet.router.price(&eth, GENESIS).unwrap(), 30 * WAD);
        assert!(devnet.router.lots(AuctionKind::Collateral, keel_auction::LotId(1)).is_some());
    }

    #[test]
    fn test_replayed_price_rejected() {
        let (mut devnet, _) = fixture();
        let eth = devnet.collateral.clone();
        let signature = devnet.signer.sign_price(1, 10 * WAD, &eth);
        let data = tx_builder::build_set_price(1, 10 * WAD, &signature, &eth);
        assert_eq!(devnet.submit(ADMIN, &data), Err(LedgerError::StaleNonce));
        assert_eq!(devnet.router.price(&eth, devnet.now).unwrap(), 30 * WAD);
    }

    #[test]
    fn test_publish_refreshes() {
        let (mut devnet, _) = fixture();
        devnet.advance(3_000);
        devnet.publish_prices(25 * WAD).unwrap();
        devnet.advance(3_000);
        assert_eq!(devnet.router.price(&devnet.collateral, devnet.now).unwrap(), 25 * WAD);
    }
}
