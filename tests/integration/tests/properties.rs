//! Property tests: ratio invariant, oracle nonce monotonicity, auction decay

use keel_auction::{DutchParams, LotStatus};
use keel_common::{wad_mul, LedgerError, WAD};
use keel_integration_tests::*;
use keel_router::{invariants, AuctionKind};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// After minting, `D * R <= C * P`
    #[test]
    fn prop_minted_debt_respects_ratio(
        collateral in WAD..=FUNDED,
        price_cents in 1u128..=1_000_000,
        ratio_bps in 12_001u128..=50_000,
    ) {
        let mut h = Harness::new().unwrap();
        let price = price_cents * WAD / 100;
        let ratio = ratio_bps * WAD / 10_000;
        h.set_price(&eth(), price).unwrap();

        let minted = h.produce(ALICE, collateral, ratio).unwrap();
        let position = h.router.collaterals(&eth(), &ALICE);
        prop_assert_eq!(position.debt, minted);
        prop_assert!(wad_mul(position.debt, ratio).unwrap() <= wad_mul(collateral, price).unwrap());
        prop_assert!(invariants::check(h.router.state()).is_ok());
    }

    /// A price is accepted exactly when its nonce exceeds every nonce
    /// accepted before it
    #[test]
    fn prop_oracle_nonce_monotone(nonces in prop::collection::vec(1u64..40, 1..12)) {
        let mut h = Harness::new().unwrap();
        let admin = h.ctx(ADMIN);
        // the harness spent nonces 1 and 2 on its opening prices
        let mut last = 2u64;
        for (i, nonce) in nonces.into_iter().enumerate() {
            let price = (i as u128 + 1) * WAD;
            let signature = h.signer.sign_price(nonce, price, &eth());
            let result = h.router.set_price(&admin, nonce, price, &signature, &eth());
            if nonce > last {
                prop_assert!(result.is_ok());
                prop_assert_eq!(h.router.price(&eth(), h.now).unwrap(), price);
                last = nonce;
            } else {
                prop_assert_eq!(result, Err(LedgerError::StaleNonce));
            }
            prop_assert_eq!(h.router.state().oracle.last_nonce, last);
        }
    }

    /// A collateral lot's cost never rises while it is on sale and lands on
    /// the lower bound at `end_time`
    #[test]
    fn prop_lot_cost_decays(t1 in 0u64..=3_600, t2 in 0u64..=3_600) {
        let mut h = Harness::new().unwrap();
        h.produce(ALICE, WAD, 3 * WAD / 2).unwrap();
        let lot = h.router.collaterals(&eth(), &ALICE).lot.unwrap();
        h.set_price(&eth(), 97 * WAD / 100).unwrap();
        let bob = h.ctx(BOB);
        h.router.start_auction(&bob, lot, 0).unwrap();
        prop_assert_eq!(h.router.lot_status(AuctionKind::Collateral, lot), LotStatus::Auctioned);

        let start = h.now;
        let (early, late) = (t1.min(t2), t1.max(t2));
        let early_cost = h.router.current_cost(AuctionKind::Collateral, lot, start + early).unwrap();
        let late_cost = h.router.current_cost(AuctionKind::Collateral, lot, start + late).unwrap();
        prop_assert!(early_cost >= late_cost);

        let params = DutchParams::default();
        let floor = wad_mul(97 * WAD / 100, params.lower_bound_cost).unwrap();
        prop_assert_eq!(
            h.router.current_cost(AuctionKind::Collateral, lot, start + params.auction_duration).unwrap(),
            floor
        );
        prop_assert!(late_cost >= floor);
    }
}
