//! End-to-end scenarios against a router with real signature recovery

use keel_auction::{LotId, LotStatus};
use keel_common::{InstructionWriter, LedgerError, WAD};
use keel_integration_tests::*;
use keel_oracle::PriceSigner;
use keel_router::{invariants, process_instruction, AuctionKind, RouterInstruction};

const DURATION: u64 = 3_600;

/// ALICE borrows 20 kUSD against 1 ETH at 30; BOB borrows 100 against 10 ETH
fn opened() -> (Harness, LotId) {
    let mut h = Harness::new().unwrap();
    assert_eq!(h.produce(ALICE, WAD, 3 * WAD / 2).unwrap(), 20 * WAD);
    assert_eq!(h.produce(BOB, 10 * WAD, 3 * WAD).unwrap(), 100 * WAD);
    let lot = h.router.collaterals(&eth(), &ALICE).lot.unwrap();
    (h, lot)
}

/// The literal walk-through: price 0.97 breaches 1.2, whole lot bought at
/// the lower bound
fn liquidated() -> (Harness, LotId) {
    let (mut h, lot) = opened();
    h.set_price(&eth(), 97 * WAD / 100).unwrap();
    let bob = h.ctx(BOB);
    h.router.start_auction(&bob, lot, 0).unwrap();
    h.advance(DURATION);
    let bob = h.ctx(BOB);
    let cost = h.router.current_cost(AuctionKind::Collateral, lot, h.now).unwrap();
    h.router.buy_lot(&bob, lot, cost).unwrap();
    (h, lot)
}

#[test]
fn test_literal_liquidation_scenario() {
    let (mut h, lot) = opened();
    assert_eq!(lot, LotId(1));

    h.set_price(&eth(), 97 * WAD / 100).unwrap();
    let health = h.router.position_health(&ALICE, &eth(), h.now).unwrap();
    assert!(health.liquidatable);
    // 0.97 / 20
    assert_eq!(health.ratio, Some(485 * WAD / 10_000));

    let start = h.now;
    let bob = h.ctx(BOB);
    assert_eq!(h.router.start_auction(&bob, lot, 0).unwrap(), WAD);

    let offered = h.router.lots(AuctionKind::Collateral, lot).unwrap().clone();
    assert_eq!(offered.status, LotStatus::Auctioned);
    assert_eq!(offered.sale_amount, WAD);
    assert_eq!(offered.end_price, 97 * WAD / 100);
    assert_eq!(offered.start_time, start);
    assert_eq!(offered.end_time, start + DURATION);

    // 0.97 * 1.2 at the start
    assert_eq!(
        h.router.current_cost(AuctionKind::Collateral, lot, h.now).unwrap(),
        1_164 * WAD / 1_000
    );

    h.advance(DURATION);
    // 0.97 * 0.8 at end_time
    let cost = h.router.current_cost(AuctionKind::Collateral, lot, h.now).unwrap();
    assert_eq!(cost, 776 * WAD / 1_000);

    let bob = h.ctx(BOB);
    let receipt = h.router.buy_lot(&bob, lot, cost).unwrap();
    assert_eq!(receipt.sale_amount, WAD);
    assert_eq!(receipt.settled, cost);
    assert_eq!(receipt.status, LotStatus::Liquidated);

    assert_eq!(h.router.lot_status(AuctionKind::Collateral, lot), LotStatus::Liquidated);
    assert_eq!(h.balance(&eth(), &BOB), FUNDED - 10 * WAD + WAD);
    assert_eq!(h.balance(&kusd(), &BOB), 100 * WAD - cost);

    let position = h.router.collaterals(&eth(), &ALICE);
    assert_eq!(position.collateral, 0);
    assert_eq!(position.debt, 0);
    // 20 - 0.776
    assert_eq!(h.router.bad_debt(), 19_224 * WAD / 1_000);
    assert!(invariants::check(h.router.state()).is_ok());
}

#[test]
fn test_partial_sale_conserves_value() {
    let (mut h, lot) = opened();
    // 23 / 20 = 1.15
    h.set_price(&eth(), 23 * WAD).unwrap();
    let health = h.router.position_health(&ALICE, &eth(), h.now).unwrap();
    assert!(health.liquidatable);
    assert!(health.max_sale > 0 && health.max_sale < WAD);

    let bob = h.ctx(BOB);
    assert_eq!(
        h.router.start_auction(&bob, lot, 0),
        Err(LedgerError::ExceedsRequiredAmount)
    );
    assert_eq!(
        h.router.start_auction(&bob, lot, health.max_sale + 1),
        Err(LedgerError::ExceedsRequiredAmount)
    );
    h.router.start_auction(&bob, lot, health.max_sale).unwrap();

    // factor is exactly 1.0 half way through
    h.advance(DURATION / 2);
    let bob = h.ctx(BOB);
    let cost = h.router.current_cost(AuctionKind::Collateral, lot, h.now).unwrap();
    let supply_before = h.router.state().stablecoin.total_supply;
    let receipt = h.router.buy_lot(&bob, lot, cost).unwrap();
    assert_eq!(receipt.status, LotStatus::New);
    assert_eq!(receipt.settled, cost);
    assert_eq!(h.router.state().stablecoin.total_supply, supply_before - cost);

    let position = h.router.collaterals(&eth(), &ALICE);
    assert_eq!(position.collateral, WAD - health.max_sale);
    assert_eq!(position.debt, 20 * WAD - cost);
    assert_eq!(position.lot, Some(lot));

    let after = h.router.position_health(&ALICE, &eth(), h.now).unwrap();
    assert!(after.ratio.unwrap() >= 149 * WAD / 100);
    assert!(!after.liquidatable);

    let totals = h.router.aggregates();
    let locked: u128 = h.router.positions().map(|p| p.collateral).sum();
    assert_eq!(totals.total_collateral(&eth()), locked);
    assert_eq!(totals.total_auctioned(&eth()), 0);
    assert_eq!(totals.bad_debt, 0);
    assert!(h.balance(&eth(), &VAULT) >= locked);
    assert!(invariants::check(h.router.state()).is_ok());
}

#[test]
fn test_cancel_is_idempotent() {
    let (mut h, lot) = opened();
    h.set_price(&eth(), 97 * WAD / 100).unwrap();
    let bob = h.ctx(BOB);
    h.router.start_auction(&bob, lot, 0).unwrap();

    h.advance(DURATION);
    let carol = h.ctx(CAROL);
    assert_eq!(h.router.cancel_auction(&carol, lot), Err(LedgerError::AuctionNotExpired));

    h.advance(1);
    let carol = h.ctx(CAROL);
    h.router.cancel_auction(&carol, lot).unwrap();
    assert_eq!(h.router.lot_status(AuctionKind::Collateral, lot), LotStatus::New);
    assert_eq!(h.router.aggregates().total_auctioned(&eth()), 0);

    let totals = h.router.aggregates().clone();
    let record = h.router.lots(AuctionKind::Collateral, lot).unwrap().clone();
    assert_eq!(h.router.cancel_auction(&carol, lot), Err(LedgerError::LotNotAuctioned));
    assert_eq!(h.router.aggregates(), &totals);
    assert_eq!(h.router.lots(AuctionKind::Collateral, lot).unwrap(), &record);

    // a fresh price lets the lot go back on sale
    h.set_price(&eth(), 97 * WAD / 100).unwrap();
    let bob = h.ctx(BOB);
    h.router.start_auction(&bob, lot, 0).unwrap();
    assert_eq!(h.router.lot_status(AuctionKind::Collateral, lot), LotStatus::Auctioned);
}

#[test]
fn test_staleness_edges() {
    let mut h = Harness::new().unwrap();

    // exactly valid_time old is still fresh
    h.advance(3_600);
    assert_eq!(h.router.price(&eth(), h.now).unwrap(), 30 * WAD);
    assert_eq!(h.produce(ALICE, WAD, 3 * WAD).unwrap(), 10 * WAD);

    h.advance(1);
    assert_eq!(h.router.price(&eth(), h.now), Err(LedgerError::StalePrice));
    assert_eq!(h.produce(BOB, WAD, 3 * WAD), Err(LedgerError::StalePrice));

    let admin = h.ctx(ADMIN);
    h.router.set_valid_time(&admin, 7_200).unwrap();
    assert_eq!(h.router.price(&eth(), h.now).unwrap(), 30 * WAD);
}

#[test]
fn test_price_nonce_and_signer() {
    let mut h = Harness::new().unwrap();
    let admin = h.ctx(ADMIN);

    let (nonce, signature) = h.sign(&eth(), 31 * WAD);
    h.router.set_price(&admin, nonce, 31 * WAD, &signature, &eth()).unwrap();
    assert_eq!(
        h.router.set_price(&admin, nonce, 31 * WAD, &signature, &eth()),
        Err(LedgerError::StaleNonce)
    );

    let old = h.signer.sign_price(1, 40 * WAD, &eth());
    assert_eq!(
        h.router.set_price(&admin, 1, 40 * WAD, &old, &eth()),
        Err(LedgerError::StaleNonce)
    );

    // signature over a different price recovers a stranger
    let (nonce, signature) = h.sign(&eth(), 32 * WAD);
    assert_eq!(
        h.router.set_price(&admin, nonce, 33 * WAD, &signature, &eth()),
        Err(LedgerError::BadSignature)
    );
    // the rejected update did not consume the nonce
    h.router.set_price(&admin, nonce, 32 * WAD, &signature, &eth()).unwrap();
    assert_eq!(h.router.price(&eth(), h.now).unwrap(), 32 * WAD);

    let stranger = PriceSigner::from_bytes(&[0x22; 32]).unwrap();
    let forged = stranger.sign_price(nonce + 1, WAD, &eth());
    assert_eq!(
        h.router.set_price(&admin, nonce + 1, WAD, &forged, &eth()),
        Err(LedgerError::BadSignature)
    );

    h.router.update_token(&admin, false, &eth()).unwrap();
    let (nonce, signature) = h.sign(&eth(), 35 * WAD);
    assert_eq!(
        h.router.set_price(&admin, nonce, 35 * WAD, &signature, &eth()),
        Err(LedgerError::DisabledToken)
    );
    assert_eq!(h.router.price(&eth(), h.now), Err(LedgerError::DisabledToken));
}

#[test]
fn test_liquidation_gating() {
    let (mut h, lot) = opened();
    let bob = h.ctx(BOB);
    assert_eq!(h.router.start_auction(&bob, lot, 0), Err(LedgerError::LotNotForSale));

    // 25 / 20 = 1.25, still above 1.2
    h.set_price(&eth(), 25 * WAD).unwrap();
    let bob = h.ctx(BOB);
    assert_eq!(h.router.start_auction(&bob, lot, 0), Err(LedgerError::LotNotForSale));

    // 24 / 20 = 1.2 sits on the threshold; (1.5 * 20 - 24) / (24 * 0.5) = 0.5
    h.set_price(&eth(), 24 * WAD).unwrap();
    let health = h.router.position_health(&ALICE, &eth(), h.now).unwrap();
    assert!(health.liquidatable);
    assert_eq!(health.max_sale, WAD / 2);

    let bob = h.ctx(BOB);
    assert_eq!(h.router.start_auction(&bob, lot, 2 * WAD), Err(LedgerError::AmountExceedsLot));
    assert_eq!(h.router.start_auction(&bob, lot, 0), Err(LedgerError::ExceedsRequiredAmount));
    assert_eq!(h.router.start_auction(&bob, lot, WAD / 2).unwrap(), WAD / 2);
    assert_eq!(h.router.start_auction(&bob, lot, WAD / 2), Err(LedgerError::StatusNotNew));

    // the owner is locked out while the lot is on sale
    let alice = h.ctx(ALICE);
    assert_eq!(
        h.router.remove_collateral(&alice, lot, WAD / 4, &eth()),
        Err(LedgerError::StatusNotNew)
    );
    assert_eq!(h.produce(ALICE, WAD, 3 * WAD), Err(LedgerError::StatusNotNew));
}

#[test]
fn test_debt_auction_flow() {
    let (mut h, _) = liquidated();
    h.set_price(&keel(), 2 * WAD).unwrap();
    let bad_debt = h.router.bad_debt();
    assert_eq!(bad_debt, 19_224 * WAD / 1_000);

    let bob = h.ctx(BOB);
    // cap is half the bad debt: 9.612
    let lot_amount = 9_612 * WAD / 1_000;
    assert_eq!(
        h.router.start_debt_auction(&bob, 10 * WAD, &keel()),
        Err(LedgerError::ExceedsLotCap)
    );
    assert_eq!(
        h.router.start_debt_auction(&bob, lot_amount, &kusd()),
        Err(LedgerError::SymbolMismatch)
    );
    let first = h.router.start_debt_auction(&bob, lot_amount, &keel()).unwrap();
    let second = h.router.start_debt_auction(&bob, lot_amount, &keel()).unwrap();
    assert_ne!(first, second);
    assert_eq!(
        h.router.start_debt_auction(&bob, WAD, &keel()),
        Err(LedgerError::ExceedsAvailableDebt)
    );
    assert_eq!(h.router.aggregates().debt_auctioned, bad_debt);

    // 9.612 * 1.2 paid, only the 9.612 reserved is written off
    let sale = h.router.buy_debt_lot(&bob, first, 12 * WAD).unwrap();
    assert_eq!(sale.cost, 115_344 * WAD / 10_000);
    assert_eq!(sale.covered, lot_amount);
    // 9.612 / 2
    assert_eq!(sale.governance_minted, 4_806 * WAD / 1_000);
    assert_eq!(h.balance(&keel(), &BOB), sale.governance_minted);
    assert_eq!(h.router.bad_debt(), bad_debt - lot_amount);
    assert_eq!(h.router.surplus(), sale.cost - lot_amount);
    assert!(h.router.aggregates().debt_auctioned <= h.router.bad_debt());

    // the second lot pays off the rest, its excess joins the surplus too
    let remaining = h.router.bad_debt();
    let sale = h.router.buy_debt_lot(&bob, second, 12 * WAD).unwrap();
    assert_eq!(sale.covered, remaining);
    assert_eq!(h.router.bad_debt(), 0);
    assert_eq!(h.router.surplus(), 2 * (sale.cost - lot_amount));
    assert_eq!(h.router.aggregates().debt_auctioned, 0);
    assert_eq!(h.router.lot_status(AuctionKind::Debt, second), LotStatus::Liquidated);
    assert!(invariants::check(h.router.state()).is_ok());
}

#[test]
fn test_surplus_auction_flow() {
    let (mut h, lot) = opened();
    // 19 < 20 debt: the whole lot sells, and at 1.2x the buyer overpays
    h.set_price(&eth(), 19 * WAD).unwrap();
    let bob = h.ctx(BOB);
    h.router.start_auction(&bob, lot, 0).unwrap();
    let receipt = h.router.buy_lot(&bob, lot, 30 * WAD).unwrap();
    // 19 * 1.2 = 22.8 against 20 debt
    assert_eq!(receipt.cost, 228 * WAD / 10);
    assert_eq!(receipt.surplus, 28 * WAD / 10);
    assert_eq!(h.router.surplus(), 28 * WAD / 10);
    assert_eq!(h.router.bad_debt(), 0);

    h.faucet_governance(CAROL, 10 * WAD).unwrap();
    let carol = h.ctx(CAROL);
    assert_eq!(
        h.router.start_surplus_auction(&carol, 2 * WAD, &keel()),
        Err(LedgerError::ExceedsLotCap)
    );
    let surplus_lot = h.router.start_surplus_auction(&carol, 14 * WAD / 10, &keel()).unwrap();
    assert_eq!(h.router.aggregates().surplus_auctioned, 14 * WAD / 10);

    // 1.4 / 2 * 1.2 governance
    let cost = h.router.current_cost(AuctionKind::Surplus, surplus_lot, h.now).unwrap();
    assert_eq!(cost, 84 * WAD / 100);
    let sale = h.router.buy_surplus_lot(&carol, surplus_lot, cost).unwrap();
    assert_eq!(sale.amount, 14 * WAD / 10);
    assert_eq!(sale.governance_burned, cost);

    assert_eq!(h.balance(&kusd(), &CAROL), 14 * WAD / 10);
    assert_eq!(h.balance(&keel(), &CAROL), 10 * WAD - cost);
    assert_eq!(h.router.state().governance.total_supply, 10 * WAD - cost);
    assert_eq!(h.router.surplus(), 14 * WAD / 10);
    assert_eq!(h.router.aggregates().surplus_auctioned, 0);
    assert!(invariants::check(h.router.state()).is_ok());
}

#[test]
fn test_position_lifecycle() {
    let (mut h, lot) = opened();

    // 1 * 36 / 1.5 = 24 → 4 more
    h.set_price(&eth(), 36 * WAD).unwrap();
    let alice = h.ctx(ALICE);
    assert_eq!(h.router.claim_extra_debt(&alice, lot, &eth()).unwrap(), 4 * WAD);
    assert_eq!(h.router.claim_extra_debt(&alice, lot, &eth()), Err(LedgerError::PriceNotRisen));

    // 1 * 24 / 1.5 = 16 → repay 8
    h.set_price(&eth(), 24 * WAD).unwrap();
    let alice = h.ctx(ALICE);
    assert_eq!(
        h.router.dispose_debt(&alice, lot, &eth(), 7 * WAD),
        Err(LedgerError::InsufficientValue)
    );
    assert_eq!(h.router.dispose_debt(&alice, lot, &eth(), 8 * WAD).unwrap(), 8 * WAD);
    assert_eq!(h.router.collaterals(&eth(), &ALICE).debt, 16 * WAD);

    let bob = h.ctx(BOB);
    assert_eq!(
        h.router.remove_collateral(&bob, lot, WAD, &eth()),
        Err(LedgerError::NotOwner)
    );

    // full withdrawal burns all 16 and pays a 0.5% fee, half to the receiver
    let released = h.router.remove_collateral(&alice, lot, WAD, &eth()).unwrap();
    assert_eq!(released, 995 * WAD / 1_000);
    assert_eq!(h.balance(&eth(), &ALICE), FUNDED - WAD + released);
    assert_eq!(h.balance(&eth(), &ADMIN), 25 * WAD / 10_000);
    assert_eq!(h.router.aggregates().fee_pool(&eth()), 25 * WAD / 10_000);
    assert_eq!(h.balance(&kusd(), &ALICE), 0);
    assert_eq!(h.router.lot_status(AuctionKind::Collateral, lot), LotStatus::Closed);
    assert!(h.router.collaterals(&eth(), &ALICE).is_empty());
    assert!(invariants::check(h.router.state()).is_ok());
}

#[test]
fn test_instruction_bytes() {
    let mut h = Harness::new().unwrap();
    let alice = h.ctx(ALICE);

    let produce = InstructionWriter::new(RouterInstruction::ProduceStablecoin as u8)
        .u128(WAD)
        .u128(3 * WAD / 2)
        .symbol(&eth())
        .build();
    process_instruction(&mut h.router, &alice, &produce).unwrap();
    assert_eq!(h.balance(&kusd(), &ALICE), 20 * WAD);

    let mut trailing = produce.clone();
    trailing.push(0);
    assert_eq!(
        process_instruction(&mut h.router, &alice, &trailing),
        Err(LedgerError::InvalidInstruction)
    );
    assert_eq!(
        process_instruction(&mut h.router, &alice, &[99]),
        Err(LedgerError::InvalidInstruction)
    );
    assert_eq!(
        process_instruction(&mut h.router, &alice, &[]),
        Err(LedgerError::InvalidInstruction)
    );

    // nested oracle update signed by the validator
    let (nonce, signature) = h.sign(&eth(), 31 * WAD);
    let inner = InstructionWriter::new(keel_oracle::OracleInstruction::SetPrice as u8)
        .u64(nonce)
        .u128(31 * WAD)
        .signature(&signature)
        .symbol(&eth())
        .build();
    let data = InstructionWriter::new(RouterInstruction::Oracle as u8).raw(&inner).build();
    process_instruction(&mut h.router, &alice, &data).unwrap();
    assert_eq!(h.router.price(&eth(), h.now).unwrap(), 31 * WAD);
}
