// 2.0: pricing engine. pure functions over a pool snapshot, never mutates.
// a side's price is the opposite reserve over the total: price_yes rises as
// the YES reserve drains. the two prices always sum to exactly 1.
//
// buys fill at the pre-trade marginal price (fee withheld from the gross
// collateral before pricing). sells fill at the post-trade marginal price,
// so immediately reversing a buy returns exactly its net collateral and the
// round trip loses only fees. either way the fill stays inside the
// pre-trade/post-trade marginal band.

use crate::market::Market;
use crate::types::{Price, Side};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

/// Instantaneous prices for both sides of a pool.
pub fn price(reserve_yes: Decimal, reserve_no: Decimal) -> (Price, Price) {
    debug_assert!(reserve_yes > Decimal::ZERO && reserve_no > Decimal::ZERO);
    let price_yes = Price::new_unchecked(reserve_no / (reserve_yes + reserve_no));
    (price_yes, price_yes.complement())
}

/// Price of one side of a pool.
pub fn side_price(reserve_yes: Decimal, reserve_no: Decimal, side: Side) -> Price {
    let (price_yes, price_no) = price(reserve_yes, reserve_no);
    match side {
        Side::Yes => price_yes,
        Side::No => price_no,
    }
}

/// A priced buy, ready for the executor to commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyQuote {
    pub side: Side,
    /// Gross collateral supplied by the buyer.
    pub collateral_in: Decimal,
    /// Fee withheld before pricing.
    pub fee: Decimal,
    /// Collateral entering the pool.
    pub net_in: Decimal,
    pub shares_out: Decimal,
    pub fill_price: Price,
}

/// A priced sell, ready for the executor to commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellQuote {
    pub side: Side,
    pub shares_in: Decimal,
    /// Collateral leaving the pool.
    pub gross_out: Decimal,
    /// Fee withheld from the proceeds.
    pub fee: Decimal,
    /// Collateral the seller receives.
    pub collateral_out: Decimal,
    pub fill_price: Price,
}

/// Quote a buy of `side` shares for `collateral_in` against the market's
/// current pool. Shares are priced at the pre-trade marginal price after the
/// fee is withheld.
pub fn quote_buy(
    market: &Market,
    side: Side,
    collateral_in: Decimal,
) -> Result<BuyQuote, PricingError> {
    if collateral_in <= Decimal::ZERO {
        return Err(PricingError::InvalidAmount(collateral_in));
    }

    let fee = market.fee_bps.fee_on(collateral_in);
    let net_in = collateral_in - fee;
    let fill_price = side_price(market.reserve_yes, market.reserve_no, side);
    let shares_out = net_in / fill_price.value();

    Ok(BuyQuote {
        side,
        collateral_in,
        fee,
        net_in,
        shares_out,
        fill_price,
    })
}

/// Quote a sale of `shares_in` shares of `side` back to the pool.
///
/// The gross proceeds `g` satisfy `g = shares_in * p_post`, where `p_post` is
/// the side's marginal price after the shares rejoin the reserve and `g`
/// leaves the opposite reserve. Solving that fixed point gives the closed
/// form below; the fee is then withheld from the gross proceeds.
pub fn quote_sell(
    market: &Market,
    side: Side,
    shares_in: Decimal,
) -> Result<SellQuote, PricingError> {
    if shares_in <= Decimal::ZERO {
        return Err(PricingError::InvalidAmount(shares_in));
    }

    let (own_reserve, other_reserve) = match side {
        Side::Yes => (market.reserve_yes, market.reserve_no),
        Side::No => (market.reserve_no, market.reserve_yes),
    };

    // g^2 - g*(own + 2s + other) + s*other = 0, take the root below `other`.
    let total = own_reserve + Decimal::TWO * shares_in + other_reserve;
    let discriminant = total * total - Decimal::new(4, 0) * shares_in * other_reserve;
    // non-negative for any positive reserves: total >= 2s + other >= 2*sqrt(s*other)
    debug_assert!(discriminant >= Decimal::ZERO);
    let root = discriminant.sqrt().unwrap_or(Decimal::ZERO);
    let gross_out = (total - root) / Decimal::TWO;

    let fee = market.fee_bps.fee_on(gross_out);
    let collateral_out = gross_out - fee;
    let fill_price = Price::new_unchecked(gross_out / shares_in);

    Ok(SellQuote {
        side,
        shares_in,
        gross_out,
        fee,
        collateral_out,
        fill_price,
    })
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PricingError {
    #[error("trade amount must be positive, got {0}")]
    InvalidAmount(Decimal),
}
