//! Trader records.
//!
//! A trader holds independent positions keyed by market and side, plus
//! running totals for realized PnL, traded volume, and settlement payouts.
//! Collateral custody lives outside the engine; these are ledger entries.

use crate::position::Position;
use crate::types::{Collateral, MarketId, Side, Timestamp, TraderId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trader {
    pub id: TraderId,
    pub positions: HashMap<(MarketId, Side), Position>,
    pub realized_pnl: Collateral,
    /// Gross collateral moved across all trades, both directions.
    pub total_volume: Collateral,
    /// Collateral redeemed through settlement.
    pub total_payout: Collateral,
    pub created_at: Timestamp,
}

impl Trader {
    pub fn new(id: TraderId, timestamp: Timestamp) -> Self {
        Self {
            id,
            positions: HashMap::new(),
            realized_pnl: Collateral::zero(),
            total_volume: Collateral::zero(),
            total_payout: Collateral::zero(),
            created_at: timestamp,
        }
    }

    pub fn get_position(&self, market_id: MarketId, side: Side) -> Option<&Position> {
        self.positions.get(&(market_id, side))
    }

    pub fn set_position(&mut self, position: Position) {
        self.positions
            .insert((position.market_id, position.side), position);
    }

    pub fn remove_position(&mut self, market_id: MarketId, side: Side) -> Option<Position> {
        self.positions.remove(&(market_id, side))
    }

    /// Both sides the trader holds in one market, YES first.
    pub fn positions_in_market(&self, market_id: MarketId) -> Vec<&Position> {
        let mut positions = Vec::new();
        if let Some(yes) = self.get_position(market_id, Side::Yes) {
            positions.push(yes);
        }
        if let Some(no) = self.get_position(market_id, Side::No) {
            positions.push(no);
        }
        positions
    }

    pub fn has_open_positions(&self) -> bool {
        !self.positions.is_empty()
    }

    pub fn realize_pnl(&mut self, pnl: Collateral) {
        self.realized_pnl = self.realized_pnl.add(pnl);
    }

    pub fn record_volume(&mut self, gross: Collateral) {
        self.total_volume = self.total_volume.add(gross.abs());
    }

    pub fn record_payout(&mut self, payout: Collateral) {
        self.total_payout = self.total_payout.add(payout);
    }
}
