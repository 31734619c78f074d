// 3.0: trade executor and audit records. a quoted trade either fully applies
// to the pool or is rejected with the pool untouched: every check runs before
// the first reserve write.
//
// buying YES takes shares out of the YES reserve and adds the net collateral
// to the NO reserve; selling is the inverse. fees never enter the reserves,
// they accrue on the market as protocol revenue.

use crate::market::Market;
use crate::pricing::{BuyQuote, SellQuote};
use crate::types::{Collateral, MarketId, Price, Side, Timestamp, TradeId, TraderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    Buy,
    Sell,
}

/// Immutable record of one executed trade. Append-only; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub market_id: MarketId,
    pub trader: TraderId,
    pub side: Side,
    pub direction: TradeDirection,
    /// Shares minted to (buy) or burned from (sell) the trader.
    pub shares_delta: Decimal,
    /// Gross collateral paid by (buy) or to (sell) the trader.
    pub collateral_delta: Decimal,
    pub fill_price: Price,
    pub fee: Decimal,
    pub timestamp: Timestamp,
}

/// Commit a quoted buy against the pool.
///
/// Rejects with `PoolExhausted` if the mint would drain the bought side's
/// reserve to zero or below; the pool is left unchanged on any error.
pub fn apply_buy(market: &mut Market, quote: &BuyQuote) -> Result<(), TradeError> {
    let own_reserve = match quote.side {
        Side::Yes => market.reserve_yes,
        Side::No => market.reserve_no,
    };

    if quote.shares_out >= own_reserve {
        return Err(TradeError::PoolExhausted {
            market_id: market.id,
            side: quote.side,
            requested: quote.shares_out,
            available: own_reserve,
        });
    }

    match quote.side {
        Side::Yes => {
            market.reserve_yes -= quote.shares_out;
            market.reserve_no += quote.net_in;
        }
        Side::No => {
            market.reserve_no -= quote.shares_out;
            market.reserve_yes += quote.net_in;
        }
    }

    // gross volume counts toward liquidity; sells never reduce it
    market.liquidity = market.liquidity.add(Collateral::new(quote.collateral_in));
    market.fees_accrued = market.fees_accrued.add(Collateral::new(quote.fee));
    Ok(())
}

/// Commit a quoted sell against the pool.
///
/// The shares rejoin their own reserve and the gross proceeds leave the
/// opposite reserve. The exhaustion guard mirrors the buy side; under exact
/// quoting the gross proceeds always stay below the opposite reserve.
pub fn apply_sell(market: &mut Market, quote: &SellQuote) -> Result<(), TradeError> {
    let other_reserve = match quote.side {
        Side::Yes => market.reserve_no,
        Side::No => market.reserve_yes,
    };

    if quote.gross_out >= other_reserve {
        return Err(TradeError::PoolExhausted {
            market_id: market.id,
            side: quote.side.opposite(),
            requested: quote.gross_out,
            available: other_reserve,
        });
    }

    match quote.side {
        Side::Yes => {
            market.reserve_yes += quote.shares_in;
            market.reserve_no -= quote.gross_out;
        }
        Side::No => {
            market.reserve_no += quote.shares_in;
            market.reserve_yes -= quote.gross_out;
        }
    }

    market.fees_accrued = market.fees_accrued.add(Collateral::new(quote.fee));
    Ok(())
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TradeError {
    #[error(
        "pool exhausted on market {market_id}: {side} reserve {available} cannot cover {requested}"
    )]
    PoolExhausted {
        market_id: MarketId,
        side: Side,
        requested: Decimal,
        available: Decimal,
    },
}
