// 4.0: per-trader, per-market, per-side share balances and realized PnL.
// 4.1+ has the buy/sell/settlement transitions at the bottom.
//
// a trader may hold YES and NO positions in the same market at once; the two
// are tracked independently. cost basis releases proportionally on partial
// sells, and settlement redeems winning shares at par (1 collateral each).

use crate::types::{Collateral, MarketId, Outcome, Side, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub market_id: MarketId,
    pub side: Side,
    pub shares: Decimal,
    /// Collateral paid to acquire the current share balance.
    pub cost_basis: Collateral,
    pub opened_at: Timestamp,
    pub updated_at: Timestamp,
    pub realized_pnl: Collateral,
}

impl Position {
    pub fn open(
        market_id: MarketId,
        side: Side,
        shares: Decimal,
        cost: Collateral,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            market_id,
            side,
            shares,
            cost_basis: cost,
            opened_at: timestamp,
            updated_at: timestamp,
            realized_pnl: Collateral::zero(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_zero()
    }

    /// Average price paid per share currently held.
    pub fn average_cost(&self) -> Option<Decimal> {
        if self.shares.is_zero() {
            None
        } else {
            Some(self.cost_basis.value() / self.shares)
        }
    }

    // 4.1: buys stack shares and basis
    pub fn apply_buy(&mut self, shares_out: Decimal, collateral_spent: Collateral, now: Timestamp) {
        self.shares += shares_out;
        self.cost_basis = self.cost_basis.add(collateral_spent);
        self.updated_at = now;
    }
}

/// Result of selling part or all of a position.
#[derive(Debug, Clone)]
pub struct SellUpdate {
    /// None when the position fully closed.
    pub new_position: Option<Position>,
    /// Collateral received minus the basis released.
    pub realized_pnl: Collateral,
    /// Basis attributed to the sold shares.
    pub released_basis: Collateral,
}

// 4.2: selling releases basis proportionally and realizes the difference
pub fn apply_sell(
    position: &Position,
    shares_in: Decimal,
    collateral_received: Collateral,
    now: Timestamp,
) -> Result<SellUpdate, LedgerError> {
    if shares_in > position.shares {
        return Err(LedgerError::InsufficientShares {
            requested: shares_in,
            held: position.shares,
        });
    }
    debug_assert!(shares_in > Decimal::ZERO);

    let released_basis = position
        .cost_basis
        .mul(shares_in / position.shares);
    let realized = collateral_received.sub(released_basis);

    let remaining = position.shares - shares_in;
    if remaining.is_zero() {
        return Ok(SellUpdate {
            new_position: None,
            realized_pnl: realized,
            released_basis: position.cost_basis,
        });
    }

    let mut new_position = position.clone();
    new_position.shares = remaining;
    new_position.cost_basis = position.cost_basis.sub(released_basis);
    new_position.realized_pnl = position.realized_pnl.add(realized);
    new_position.updated_at = now;

    Ok(SellUpdate {
        new_position: Some(new_position),
        realized_pnl: realized,
        released_basis,
    })
}

/// Outcome of settling one position after resolution.
#[derive(Debug, Clone)]
pub struct SettlementUpdate {
    /// Par redemption for winners, zero for the losing side.
    pub payout: Collateral,
    /// Payout minus the position's remaining basis.
    pub realized_pnl: Collateral,
}

// 4.3: settlement. winning shares redeem at par, losing shares at zero; the
// position is consumed either way and cannot re-enter a resolved market.
pub fn apply_settlement(position: &Position, outcome: Outcome) -> SettlementUpdate {
    let payout = if position.side == outcome.winning_side() {
        Collateral::new(position.shares)
    } else {
        Collateral::zero()
    };

    SettlementUpdate {
        payout,
        realized_pnl: payout.sub(position.cost_basis),
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient shares: requested {requested}, held {held}")]
    InsufficientShares { requested: Decimal, held: Decimal },
}
