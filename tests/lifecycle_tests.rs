//! End-to-end market lifecycle scenarios.
//!
//! Exercises the engine facade through the documented reference scenario:
//! seed 1000 collateral at 100 bps, buy YES with 100, resolve, settle.

use pm_core::*;
use rust_decimal_macros::dec;

const HOUR_MS: i64 = 3_600_000;

fn test_engine() -> Engine {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(Timestamp::from_millis(1_700_000_000_000));
    engine
}

fn standard_params(engine: &Engine) -> MarketParams {
    MarketParams {
        statement: "Will the incumbent win?".to_string(),
        initial_liquidity: dec!(1000),
        fee_bps: 100,
        closes_at: Timestamp::from_millis(engine.time().as_millis() + 24 * HOUR_MS),
    }
}

#[test]
fn reference_buy_scenario() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let alice = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    let market = engine.get_market(market_id).unwrap();
    assert_eq!(market.reserve_yes, dec!(500));
    assert_eq!(market.reserve_no, dec!(500));

    let result = engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), alice)
        .unwrap();

    assert_eq!(result.fee, dec!(1));
    assert_eq!(result.shares_out, dec!(198));
    assert_eq!(result.fill_price.value(), dec!(0.5));
    assert_eq!(result.position_shares, dec!(198));

    let market = engine.get_market(market_id).unwrap();
    assert_eq!(market.reserve_yes, dec!(302));
    assert_eq!(market.reserve_no, dec!(599));
    assert_eq!(market.liquidity.value(), dec!(1100));
    assert_eq!(market.fees_accrued.value(), dec!(1));

    let (yes, no) = engine.prices(market_id).unwrap();
    assert_eq!(yes.value() + no.value(), dec!(1));
    assert!(yes.value() > dec!(0.5));
}

#[test]
fn reference_sell_reverses_buy() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let alice = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    let buy = engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), alice)
        .unwrap();
    let sell = engine
        .quote_and_sell(market_id, Side::Yes, buy.shares_out, alice)
        .unwrap();

    let tolerance = dec!(0.0000001);

    // gross proceeds equal the net the buy deposited; the fee comes on top
    assert!((sell.fee - dec!(0.99)).abs() < tolerance);
    assert!((sell.collateral_out - dec!(98.01)).abs() < tolerance);
    assert_eq!(sell.position_shares, dec!(0));

    let market = engine.get_market(market_id).unwrap();
    assert_eq!(market.reserve_yes, dec!(500));
    assert!((market.reserve_no - dec!(500)).abs() < tolerance);
    assert!((market.fees_accrued.value() - dec!(1.99)).abs() < tolerance);

    // trader ends down roughly the two fees
    let trader = engine.get_trader(alice).unwrap();
    assert!((trader.realized_pnl.value() + dec!(1.99)).abs() < tolerance);
    assert!(trader.get_position(market_id, Side::Yes).is_none());
}

#[test]
fn settlement_pays_winning_side_only() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let alice = engine.create_trader();
    let bob = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), alice)
        .unwrap();
    engine
        .quote_and_buy(market_id, Side::No, dec!(50), bob)
        .unwrap();

    engine
        .resolve_market(market_id, Outcome::Yes, authority)
        .unwrap();
    let result = engine.settle_market(market_id).unwrap();

    assert_eq!(result.outcome, Outcome::Yes);
    assert_eq!(result.positions_settled, 2);
    assert_eq!(result.total_payout.value(), dec!(198));

    let alice_state = engine.get_trader(alice).unwrap();
    assert_eq!(alice_state.total_payout.value(), dec!(198));
    assert_eq!(alice_state.realized_pnl.value(), dec!(98));

    let bob_state = engine.get_trader(bob).unwrap();
    assert!(bob_state.total_payout.is_zero());
    assert_eq!(bob_state.realized_pnl.value(), dec!(-50));
}

#[test]
fn settlement_is_idempotent() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let alice = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), alice)
        .unwrap();
    engine
        .resolve_market(market_id, Outcome::Yes, authority)
        .unwrap();

    let first = engine.settle_market(market_id).unwrap();
    let second = engine.settle_market(market_id).unwrap();

    assert_eq!(first.total_payout.value(), dec!(198));
    assert_eq!(second.positions_settled, 0);
    assert!(second.total_payout.is_zero());

    // trader totals unchanged by the second pass
    let trader = engine.get_trader(alice).unwrap();
    assert_eq!(trader.total_payout.value(), dec!(198));
    assert_eq!(
        engine.get_market(market_id).unwrap().total_paid_out.value(),
        dec!(198)
    );
}

#[test]
fn double_resolution_rejected() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    engine
        .resolve_market(market_id, Outcome::Yes, authority)
        .unwrap();
    let err = engine
        .resolve_market(market_id, Outcome::No, authority)
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Market(MarketError::AlreadyResolved(_))
    ));
    // first outcome stands
    assert_eq!(
        engine.get_market(market_id).unwrap().outcome,
        Some(Outcome::Yes)
    );
}

#[test]
fn trading_stops_at_close_time() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let alice = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    engine.advance_time(24 * HOUR_MS);

    let err = engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), alice)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Market(MarketError::MarketClosed(_))
    ));
}

#[test]
fn anyone_can_resolve_after_close() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let outsider = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    let before_close = engine
        .resolve_market(market_id, Outcome::Yes, outsider)
        .unwrap_err();
    assert!(matches!(
        before_close,
        EngineError::Market(MarketError::UnauthorizedResolution(_))
    ));

    engine.advance_time(24 * HOUR_MS);
    engine
        .resolve_market(market_id, Outcome::Yes, outsider)
        .unwrap();
}

#[test]
fn oversell_rejected_before_quoting() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let alice = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), alice)
        .unwrap();

    let err = engine
        .quote_and_sell(market_id, Side::Yes, dec!(199), alice)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::InsufficientShares { .. })
    ));

    // selling a side never bought fails the same way
    let err = engine
        .quote_and_sell(market_id, Side::No, dec!(1), alice)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Ledger(LedgerError::InsufficientShares { .. })
    ));
}

#[test]
fn unknown_market_reported_before_share_balance() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let alice = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), alice)
        .unwrap();

    // a bogus market id fails the lookup, not the cover check
    let bogus = MarketId([0xff; 16]);
    let err = engine
        .quote_and_sell(bogus, Side::Yes, dec!(50), alice)
        .unwrap_err();
    assert!(matches!(err, EngineError::MarketNotFound(_)));

    let err = engine
        .quote_and_buy(bogus, Side::Yes, dec!(50), alice)
        .unwrap_err();
    assert!(matches!(err, EngineError::MarketNotFound(_)));
}

#[test]
fn pool_exhaustion_leaves_state_untouched() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let alice = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    // net 297 at price 0.5 asks for 594 shares from a 500-share reserve
    let err = engine
        .quote_and_buy(market_id, Side::Yes, dec!(300), alice)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Trade(TradeError::PoolExhausted { .. })
    ));

    let market = engine.get_market(market_id).unwrap();
    assert_eq!(market.reserve_yes, dec!(500));
    assert_eq!(market.reserve_no, dec!(500));
    assert_eq!(market.liquidity.value(), dec!(1000));
    assert!(engine.get_trader(alice).unwrap().positions.is_empty());
    assert!(engine.trades().is_empty());
}

#[test]
fn both_sides_held_independently() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let alice = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), alice)
        .unwrap();
    engine
        .quote_and_buy(market_id, Side::No, dec!(100), alice)
        .unwrap();

    let trader = engine.get_trader(alice).unwrap();
    let positions = trader.positions_in_market(market_id);
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].side, Side::Yes);
    assert_eq!(positions[1].side, Side::No);

    // settling pays out only the winning leg
    engine
        .resolve_market(market_id, Outcome::No, authority)
        .unwrap();
    let result = engine.settle_market(market_id).unwrap();
    assert_eq!(result.positions_settled, 2);

    let trader = engine.get_trader(alice).unwrap();
    assert!(!trader.has_open_positions());
    assert!(trader.total_payout.value() > dec!(0));
}

#[test]
fn invalid_market_parameters_rejected() {
    let mut engine = test_engine();
    let authority = engine.create_trader();

    let mut params = standard_params(&engine);
    params.initial_liquidity = dec!(0);
    assert!(matches!(
        engine.create_market(params, authority).unwrap_err(),
        EngineError::Market(MarketError::InvalidParameters { .. })
    ));

    let mut params = standard_params(&engine);
    params.fee_bps = 10_000;
    assert!(matches!(
        engine.create_market(params, authority).unwrap_err(),
        EngineError::Market(MarketError::InvalidParameters { .. })
    ));

    let mut params = standard_params(&engine);
    params.closes_at = engine.time();
    assert!(matches!(
        engine.create_market(params, authority).unwrap_err(),
        EngineError::Market(MarketError::InvalidParameters { .. })
    ));

    let mut params = standard_params(&engine);
    params.statement = "x".repeat(MAX_STATEMENT_LEN + 1);
    assert!(matches!(
        engine.create_market(params, authority).unwrap_err(),
        EngineError::Market(MarketError::InvalidParameters { .. })
    ));
}

#[test]
fn duplicate_market_rejected() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let params = standard_params(&engine);

    engine.create_market(params.clone(), authority).unwrap();
    let err = engine.create_market(params, authority).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Market(MarketError::InvalidParameters { .. })
    ));
}

#[test]
fn markets_are_independent() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let alice = engine.create_trader();

    let first = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();
    let mut other = standard_params(&engine);
    other.statement = "Will turnout exceed 60%?".to_string();
    let second = engine.create_market(other, authority).unwrap();

    engine
        .quote_and_buy(first, Side::Yes, dec!(100), alice)
        .unwrap();
    engine
        .resolve_market(first, Outcome::Yes, authority)
        .unwrap();
    engine.settle_market(first).unwrap();

    let untouched = engine.get_market(second).unwrap();
    assert_eq!(untouched.reserve_yes, dec!(500));
    assert_eq!(untouched.reserve_no, dec!(500));
    assert_eq!(untouched.status, MarketStatus::Active);
    assert_eq!(engine.trades_for_market(second).count(), 0);
}

#[test]
fn event_log_covers_the_lifecycle() {
    let mut engine = test_engine();
    let authority = engine.create_trader();
    let alice = engine.create_trader();
    let market_id = engine
        .create_market(standard_params(&engine), authority)
        .unwrap();

    engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), alice)
        .unwrap();
    engine
        .quote_and_sell(market_id, Side::Yes, dec!(98), alice)
        .unwrap();
    engine
        .resolve_market(market_id, Outcome::Yes, authority)
        .unwrap();
    engine.settle_market(market_id).unwrap();

    let kinds: Vec<&str> = engine
        .events()
        .iter()
        .map(|e| match &e.payload {
            EventPayload::MarketCreated(_) => "created",
            EventPayload::SharesBought(_) => "bought",
            EventPayload::SharesSold(_) => "sold",
            EventPayload::MarketResolved(_) => "resolved",
            EventPayload::PositionSettled(_) => "settled",
        })
        .collect();

    assert_eq!(kinds, vec!["created", "bought", "sold", "resolved", "settled"]);

    // ids are dense and ordered
    for (i, event) in engine.events().iter().enumerate() {
        assert_eq!(event.id, EventId(i as u64 + 1));
    }
}
