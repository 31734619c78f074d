// 6.0: every committed state change produces an event. used for audit trails,
// state reconstruction, and notifying external systems. the EventPayload enum
// lists all event types.

use crate::types::{Collateral, MarketId, Outcome, Price, Side, Timestamp, TradeId, TraderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    MarketCreated(MarketCreatedEvent),
    SharesBought(SharesBoughtEvent),
    SharesSold(SharesSoldEvent),
    MarketResolved(MarketResolvedEvent),
    PositionSettled(PositionSettledEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketCreatedEvent {
    pub market_id: MarketId,
    pub statement: String,
    pub authority: TraderId,
    pub initial_liquidity: Decimal,
    pub fee_bps: u16,
    pub closes_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharesBoughtEvent {
    pub market_id: MarketId,
    pub trade_id: TradeId,
    pub trader: TraderId,
    pub side: Side,
    pub collateral_in: Decimal,
    pub shares_out: Decimal,
    pub fill_price: Price,
    pub fee: Decimal,
    pub new_reserve_yes: Decimal,
    pub new_reserve_no: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharesSoldEvent {
    pub market_id: MarketId,
    pub trade_id: TradeId,
    pub trader: TraderId,
    pub side: Side,
    pub shares_in: Decimal,
    pub collateral_out: Decimal,
    pub fill_price: Price,
    pub fee: Decimal,
    pub realized_pnl: Decimal,
    pub new_reserve_yes: Decimal,
    pub new_reserve_no: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketResolvedEvent {
    pub market_id: MarketId,
    pub outcome: Outcome,
    pub resolver: TraderId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSettledEvent {
    pub market_id: MarketId,
    pub trader: TraderId,
    pub side: Side,
    pub shares_redeemed: Decimal,
    pub payout: Collateral,
    pub realized_pnl: Collateral,
}
