// 5.0.2: result types and errors for engine operations.

use crate::market::MarketError;
use crate::position::LedgerError;
use crate::pricing::PricingError;
use crate::trade::TradeError;
use crate::types::{Collateral, MarketId, Outcome, Price, Side, TradeId, TraderId};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct BuyResult {
    pub trade_id: TradeId,
    pub market_id: MarketId,
    pub side: Side,
    pub collateral_in: Decimal,
    pub fee: Decimal,
    pub shares_out: Decimal,
    pub fill_price: Price,
    /// Trader's total holding on this side after the trade.
    pub position_shares: Decimal,
}

#[derive(Debug, Clone)]
pub struct SellResult {
    pub trade_id: TradeId,
    pub market_id: MarketId,
    pub side: Side,
    pub shares_in: Decimal,
    pub fee: Decimal,
    pub collateral_out: Decimal,
    pub fill_price: Price,
    pub realized_pnl: Collateral,
    /// Shares remaining on this side after the trade.
    pub position_shares: Decimal,
}

#[derive(Debug, Clone)]
pub struct SettlementResult {
    pub market_id: MarketId,
    pub outcome: Outcome,
    pub positions_settled: usize,
    pub total_payout: Collateral,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("market {0} not found")]
    MarketNotFound(MarketId),

    #[error("trader {0:?} not found")]
    TraderNotFound(TraderId),

    #[error("market error: {0}")]
    Market(#[from] MarketError),

    #[error("pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("trade error: {0}")]
    Trade(#[from] TradeError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
