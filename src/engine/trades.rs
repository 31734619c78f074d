//! Trade execution: quote-then-commit buys and sells.
//!
//! Sequencing keeps commits atomic: every fallible check (tradability, quote
//! validation, ledger cover, pool exhaustion) runs before the first state
//! write, so a rejected trade leaves the pool and ledger untouched.

use super::core::Engine;
use super::results::{BuyResult, EngineError, SellResult};
use crate::events::{EventPayload, SharesBoughtEvent, SharesSoldEvent};
use crate::position::{self, Position};
use crate::pricing::{quote_buy, quote_sell};
use crate::trade::{apply_buy, apply_sell, Trade, TradeDirection};
use crate::types::{Collateral, MarketId, Side, TraderId};
use rust_decimal::Decimal;

impl Engine {
    /// Buy `side` shares with `collateral_in` gross collateral.
    ///
    /// Payment verification happens upstream: the caller asserts receipt of
    /// `collateral_in` before invoking the engine.
    pub fn quote_and_buy(
        &mut self,
        market_id: MarketId,
        side: Side,
        collateral_in: Decimal,
        trader_id: TraderId,
    ) -> Result<BuyResult, EngineError> {
        if !self.traders.contains_key(&trader_id) {
            return Err(EngineError::TraderNotFound(trader_id));
        }

        let quote = {
            let market = self
                .markets
                .get(&market_id)
                .ok_or(EngineError::MarketNotFound(market_id))?;
            market.assert_tradable(self.current_time)?;
            quote_buy(market, side, collateral_in)?
        };

        // commit to the pool; rejects PoolExhausted before any write
        let (new_reserve_yes, new_reserve_no) = {
            let market = self.markets.get_mut(&market_id).unwrap();
            apply_buy(market, &quote)?;
            (market.reserve_yes, market.reserve_no)
        };

        let now = self.current_time;
        let gross = Collateral::new(quote.collateral_in);

        let trader = self.traders.get_mut(&trader_id).unwrap();
        let position_shares = match trader.positions.get_mut(&(market_id, side)) {
            Some(pos) => {
                pos.apply_buy(quote.shares_out, gross, now);
                pos.shares
            }
            None => {
                trader.set_position(Position::open(
                    market_id,
                    side,
                    quote.shares_out,
                    gross,
                    now,
                ));
                quote.shares_out
            }
        };
        trader.record_volume(gross);

        let trade_id = self.next_trade_id();
        self.trades.push(Trade {
            id: trade_id,
            market_id,
            trader: trader_id,
            side,
            direction: TradeDirection::Buy,
            shares_delta: quote.shares_out,
            collateral_delta: quote.collateral_in,
            fill_price: quote.fill_price,
            fee: quote.fee,
            timestamp: now,
        });

        self.emit_event(EventPayload::SharesBought(SharesBoughtEvent {
            market_id,
            trade_id,
            trader: trader_id,
            side,
            collateral_in: quote.collateral_in,
            shares_out: quote.shares_out,
            fill_price: quote.fill_price,
            fee: quote.fee,
            new_reserve_yes,
            new_reserve_no,
        }));

        Ok(BuyResult {
            trade_id,
            market_id,
            side,
            collateral_in: quote.collateral_in,
            fee: quote.fee,
            shares_out: quote.shares_out,
            fill_price: quote.fill_price,
            position_shares,
        })
    }

    /// Sell `shares_in` shares of `side` back to the pool.
    pub fn quote_and_sell(
        &mut self,
        market_id: MarketId,
        side: Side,
        shares_in: Decimal,
        trader_id: TraderId,
    ) -> Result<SellResult, EngineError> {
        let held_position = self
            .traders
            .get(&trader_id)
            .ok_or(EngineError::TraderNotFound(trader_id))?
            .get_position(market_id, side)
            .cloned();

        let quote = {
            let market = self
                .markets
                .get(&market_id)
                .ok_or(EngineError::MarketNotFound(market_id))?;
            market.assert_tradable(self.current_time)?;

            // ledger cover check runs before pricing
            let held = held_position.as_ref().map(|p| p.shares).unwrap_or(Decimal::ZERO);
            if shares_in > held {
                return Err(crate::position::LedgerError::InsufficientShares {
                    requested: shares_in,
                    held,
                }
                .into());
            }
            quote_sell(market, side, shares_in)?
        };

        let now = self.current_time;
        let proceeds = Collateral::new(quote.collateral_out);

        // cover was checked above, so the ledger update cannot fail; compute
        // it before touching the pool anyway so errors never leave half a trade
        let held_position = held_position.unwrap();
        let update = position::apply_sell(&held_position, shares_in, proceeds, now)?;

        let (new_reserve_yes, new_reserve_no) = {
            let market = self.markets.get_mut(&market_id).unwrap();
            apply_sell(market, &quote)?;
            (market.reserve_yes, market.reserve_no)
        };

        let position_shares = update
            .new_position
            .as_ref()
            .map(|p| p.shares)
            .unwrap_or(Decimal::ZERO);

        let trader = self.traders.get_mut(&trader_id).unwrap();
        match update.new_position {
            Some(pos) => trader.set_position(pos),
            None => {
                trader.remove_position(market_id, side);
            }
        }
        trader.realize_pnl(update.realized_pnl);
        trader.record_volume(proceeds);

        let trade_id = self.next_trade_id();
        self.trades.push(Trade {
            id: trade_id,
            market_id,
            trader: trader_id,
            side,
            direction: TradeDirection::Sell,
            shares_delta: shares_in,
            collateral_delta: quote.collateral_out,
            fill_price: quote.fill_price,
            fee: quote.fee,
            timestamp: now,
        });

        self.emit_event(EventPayload::SharesSold(SharesSoldEvent {
            market_id,
            trade_id,
            trader: trader_id,
            side,
            shares_in,
            collateral_out: quote.collateral_out,
            fill_price: quote.fill_price,
            fee: quote.fee,
            realized_pnl: update.realized_pnl.value(),
            new_reserve_yes,
            new_reserve_no,
        }));

        Ok(SellResult {
            trade_id,
            market_id,
            side,
            shares_in,
            fee: quote.fee,
            collateral_out: quote.collateral_out,
            fill_price: quote.fill_price,
            realized_pnl: update.realized_pnl,
            position_shares,
        })
    }
}
