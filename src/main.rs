//! Binary Prediction Market Simulation.
//!
//! Demonstrates the full market lifecycle including market creation, AMM
//! pricing as trades accumulate, pool exhaustion guards, resolution, and
//! settlement payouts.

use pm_core::*;
use rust_decimal_macros::dec;

fn main() {
    println!("Binary Prediction Market Engine Simulation");
    println!("Constant-Sum AMM, Par Settlement, Full Lifecycle\n");

    scenario_1_market_lifecycle();
    scenario_2_price_drift();
    scenario_3_round_trip();
    scenario_4_pool_exhaustion();
    scenario_5_resolution_and_settlement();
    scenario_6_multi_market();

    println!("\nAll simulations completed successfully.");
}

fn hours_from_now(engine: &Engine, hours: i64) -> Timestamp {
    Timestamp::from_millis(engine.time().as_millis() + hours * 3_600_000)
}

/// Create a market, buy once, inspect the pool.
fn scenario_1_market_lifecycle() {
    println!("Scenario 1: Market Lifecycle\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(Timestamp::from_millis(1_700_000_000_000));

    let authority = engine.create_trader();
    let alice = engine.create_trader();

    let market_id = engine
        .create_market(
            MarketParams {
                statement: "Will BTC close above $100k this year?".to_string(),
                initial_liquidity: dec!(1000),
                fee_bps: 100,
                closes_at: hours_from_now(&engine, 24),
            },
            authority,
        )
        .unwrap();

    let market = engine.get_market(market_id).unwrap();
    println!("  Market {}: \"{}\"", market_id, market.statement);
    println!(
        "  Seeded {} collateral, reserves {} YES / {} NO",
        market.liquidity, market.reserve_yes, market.reserve_no
    );

    let (yes, no) = engine.prices(market_id).unwrap();
    println!("  Opening prices: YES {} / NO {}\n", yes, no);

    let result = engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), alice)
        .unwrap();
    println!(
        "  Alice buys YES with 100: fee {}, {} shares @ {}",
        result.fee, result.shares_out, result.fill_price
    );

    let market = engine.get_market(market_id).unwrap();
    let (yes, no) = engine.prices(market_id).unwrap();
    println!(
        "  Pool now {} YES / {} NO, prices YES {} / NO {}\n",
        market.reserve_yes, market.reserve_no, yes, no
    );
}

/// Repeated one-sided buying pushes the price toward 1.
fn scenario_2_price_drift() {
    println!("Scenario 2: Price Drift Under One-Sided Flow\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(Timestamp::from_millis(1_700_000_000_000));

    let authority = engine.create_trader();
    let whale = engine.create_trader();

    let market_id = engine
        .create_market(
            MarketParams {
                statement: "Will the launch slip to Q2?".to_string(),
                initial_liquidity: dec!(2000),
                fee_bps: 50,
                closes_at: hours_from_now(&engine, 48),
            },
            authority,
        )
        .unwrap();

    for round in 1..=5 {
        engine
            .quote_and_buy(market_id, Side::Yes, dec!(150), whale)
            .unwrap();
        engine.advance_time(60_000);

        let (yes, no) = engine.prices(market_id).unwrap();
        println!("  After buy {}: YES {} / NO {}", round, yes, no);
    }

    let position = engine
        .get_trader(whale)
        .unwrap()
        .get_position(market_id, Side::Yes)
        .unwrap();
    println!(
        "\n  Whale holds {} YES shares, basis {}\n",
        position.shares.round_dp(4),
        position.cost_basis
    );
}

/// Buy then immediately sell back: fees plus slippage guarantee a loss.
fn scenario_3_round_trip() {
    println!("Scenario 3: Round Trip Costs\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(Timestamp::from_millis(1_700_000_000_000));

    let authority = engine.create_trader();
    let trader = engine.create_trader();

    let market_id = engine
        .create_market(
            MarketParams {
                statement: "Will the vote pass?".to_string(),
                initial_liquidity: dec!(1000),
                fee_bps: 100,
                closes_at: hours_from_now(&engine, 24),
            },
            authority,
        )
        .unwrap();

    let buy = engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), trader)
        .unwrap();
    println!("  Buy 100 collateral of YES: {} shares", buy.shares_out);

    let sell = engine
        .quote_and_sell(market_id, Side::Yes, buy.shares_out, trader)
        .unwrap();
    println!(
        "  Sell all shares back: {} collateral out, realized PnL {}",
        sell.collateral_out.round_dp(4),
        sell.realized_pnl
    );
    println!(
        "  Round trip cost: {}\n",
        (dec!(100) - sell.collateral_out).round_dp(4)
    );
}

/// Oversized buys that would drain a reserve are rejected atomically.
fn scenario_4_pool_exhaustion() {
    println!("Scenario 4: Pool Exhaustion Guard\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(Timestamp::from_millis(1_700_000_000_000));

    let authority = engine.create_trader();
    let trader = engine.create_trader();

    let market_id = engine
        .create_market(
            MarketParams {
                statement: "Will it snow in July?".to_string(),
                initial_liquidity: dec!(1000),
                fee_bps: 100,
                closes_at: hours_from_now(&engine, 24),
            },
            authority,
        )
        .unwrap();

    let before = engine.get_market(market_id).unwrap().reserve_yes;
    println!("  Attempting to buy YES with 300 collateral into a 500-share reserve...");

    match engine.quote_and_buy(market_id, Side::Yes, dec!(300), trader) {
        Err(e) => println!("  Rejected: {}", e),
        Ok(_) => println!("  Unexpectedly filled"),
    }

    let after = engine.get_market(market_id).unwrap().reserve_yes;
    println!(
        "  YES reserve unchanged: {} before, {} after\n",
        before, after
    );
}

/// Resolve a market and pay winners at par.
fn scenario_5_resolution_and_settlement() {
    println!("Scenario 5: Resolution and Settlement\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(Timestamp::from_millis(1_700_000_000_000));

    let authority = engine.create_trader();
    let alice = engine.create_trader();
    let bob = engine.create_trader();

    let market_id = engine
        .create_market(
            MarketParams {
                statement: "Will the merger close by December?".to_string(),
                initial_liquidity: dec!(1000),
                fee_bps: 100,
                closes_at: hours_from_now(&engine, 24),
            },
            authority,
        )
        .unwrap();

    engine
        .quote_and_buy(market_id, Side::Yes, dec!(100), alice)
        .unwrap();
    engine
        .quote_and_buy(market_id, Side::No, dec!(80), bob)
        .unwrap();
    println!("  Alice backs YES with 100, Bob backs NO with 80");

    engine.resolve_market(market_id, Outcome::Yes, authority).unwrap();
    println!("  Authority resolves YES");

    let result = engine.settle_market(market_id).unwrap();
    println!(
        "  Settled {} positions, {} collateral paid out",
        result.positions_settled, result.total_payout
    );

    let alice_state = engine.get_trader(alice).unwrap();
    let bob_state = engine.get_trader(bob).unwrap();
    println!(
        "  Alice: payout {}, realized PnL {}",
        alice_state.total_payout, alice_state.realized_pnl
    );
    println!(
        "  Bob: payout {}, realized PnL {}\n",
        bob_state.total_payout, bob_state.realized_pnl
    );
}

/// Markets are independent: trades and resolution in one never touch another.
fn scenario_6_multi_market() {
    println!("Scenario 6: Multi-Market Independence\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(Timestamp::from_millis(1_700_000_000_000));

    let authority = engine.create_trader();
    let trader = engine.create_trader();

    let rain = engine
        .create_market(
            MarketParams {
                statement: "Will it rain on election day?".to_string(),
                initial_liquidity: dec!(1000),
                fee_bps: 100,
                closes_at: hours_from_now(&engine, 24),
            },
            authority,
        )
        .unwrap();
    let rate = engine
        .create_market(
            MarketParams {
                statement: "Will rates fall in September?".to_string(),
                initial_liquidity: dec!(4000),
                fee_bps: 30,
                closes_at: hours_from_now(&engine, 72),
            },
            authority,
        )
        .unwrap();

    engine.quote_and_buy(rain, Side::Yes, dec!(200), trader).unwrap();
    engine.resolve_market(rain, Outcome::No, authority).unwrap();
    engine.settle_market(rain).unwrap();

    let (rate_yes, rate_no) = engine.prices(rate).unwrap();
    println!("  Rain market resolved NO and settled");
    println!(
        "  Rate market untouched: prices YES {} / NO {}, {} trades recorded",
        rate_yes,
        rate_no,
        engine.trades_for_market(rate).count()
    );

    let total_volume = engine.get_trader(trader).unwrap().total_volume;
    println!(
        "  Trader volume across markets: {}, events logged: {}",
        total_volume,
        engine.events().len()
    );
}
