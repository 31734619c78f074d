//! Resolution and settlement.
//!
//! Resolution is a single-shot state flip on the market; settlement is a
//! separate pass that redeems every open position against the declared
//! outcome. Traders are settled in ascending id order, YES before NO, so
//! replaying the same history always produces the same event stream.

use super::core::Engine;
use super::results::{EngineError, SettlementResult};
use crate::events::{EventPayload, MarketResolvedEvent, PositionSettledEvent};
use crate::market::MarketError;
use crate::position::apply_settlement;
use crate::types::{Collateral, MarketId, Outcome, Side, TraderId};

impl Engine {
    /// Declare the outcome of a market.
    ///
    /// The market authority may resolve at any time. Anyone else may resolve
    /// only once `closes_at` has passed.
    pub fn resolve_market(
        &mut self,
        market_id: MarketId,
        outcome: Outcome,
        caller: TraderId,
    ) -> Result<(), EngineError> {
        let now = self.current_time;
        let market = self
            .markets
            .get_mut(&market_id)
            .ok_or(EngineError::MarketNotFound(market_id))?;
        market.resolve(outcome, caller, now)?;

        self.emit_event(EventPayload::MarketResolved(MarketResolvedEvent {
            market_id,
            outcome,
            resolver: caller,
        }));
        Ok(())
    }

    /// Redeem every open position in a resolved market.
    ///
    /// Winning shares pay 1 collateral each, losing shares pay nothing.
    /// Running settlement twice is harmless: the second pass finds no open
    /// positions and settles zero.
    pub fn settle_market(&mut self, market_id: MarketId) -> Result<SettlementResult, EngineError> {
        let outcome = {
            let market = self
                .markets
                .get(&market_id)
                .ok_or(EngineError::MarketNotFound(market_id))?;
            market
                .outcome
                .ok_or(MarketError::NotResolved(market_id))?
        };

        let mut trader_ids: Vec<TraderId> = self.traders.keys().copied().collect();
        trader_ids.sort();

        let mut positions_settled = 0usize;
        let mut total_payout = Collateral::zero();
        let mut settlement_events = Vec::new();

        for trader_id in trader_ids {
            for side in [Side::Yes, Side::No] {
                let trader = self.traders.get_mut(&trader_id).unwrap();
                let position = match trader.remove_position(market_id, side) {
                    Some(pos) => pos,
                    None => continue,
                };

                let update = apply_settlement(&position, outcome);
                trader.record_payout(update.payout);
                trader.realize_pnl(update.realized_pnl);

                positions_settled += 1;
                total_payout = total_payout.add(update.payout);
                settlement_events.push(PositionSettledEvent {
                    market_id,
                    trader: trader_id,
                    side,
                    shares_redeemed: position.shares,
                    payout: update.payout,
                    realized_pnl: update.realized_pnl,
                });
            }
        }

        let market = self.markets.get_mut(&market_id).unwrap();
        market.record_payout(total_payout);

        for event in settlement_events {
            self.emit_event(EventPayload::PositionSettled(event));
        }

        Ok(SettlementResult {
            market_id,
            outcome,
            positions_settled,
            total_payout,
        })
    }
}
