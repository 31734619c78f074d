//! Market state and structural invariants.
//!
//! A market is one binary prediction question backed by a two-sided reserve
//! pool. Both reserves stay strictly positive while the market is active;
//! all reserve mutation goes through the trade executor, and resolution
//! freezes the pool at its final values.

use crate::types::{Collateral, FeeBps, MarketId, Outcome, Timestamp, TraderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

pub const MAX_STATEMENT_LEN: usize = 256;

/// Market lifecycle. The only transition is `Active -> Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketStatus {
    /// Open for trading until `closes_at`.
    Active,
    /// Terminal. Reserves frozen, outcome set exactly once.
    Resolved,
}

/// Inputs for market creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketParams {
    /// The question being predicted, e.g. "BTC above $100k by June 30".
    pub statement: String,
    /// Collateral seeding the pool, split evenly across both sides.
    pub initial_liquidity: Decimal,
    /// Fee in basis points charged on trade volume, fixed for the market's life.
    pub fee_bps: u16,
    /// Trading cutoff. Trades at or after this instant are rejected.
    pub closes_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub statement: String,
    /// Creator; the only party allowed to resolve before `closes_at`.
    pub authority: TraderId,
    pub reserve_yes: Decimal,
    pub reserve_no: Decimal,
    /// Cumulative gross collateral ever deposited: initial liquidity plus
    /// every buy. Sells never reduce it. Historical volume, not current TVL.
    pub liquidity: Collateral,
    /// Fees withheld from trades. Held outside the reserves.
    pub fees_accrued: Collateral,
    /// Running total of settlement payouts after resolution.
    pub total_paid_out: Collateral,
    pub fee_bps: FeeBps,
    pub status: MarketStatus,
    pub outcome: Option<Outcome>,
    pub closes_at: Timestamp,
    pub created_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

/// Deterministic market id: first 16 bytes of keccak256 over the statement
/// and close time. Replaces ledger-specific address derivation with a pure
/// function of the market parameters.
pub fn derive_market_id(statement: &str, closes_at: Timestamp) -> MarketId {
    let mut hasher = Keccak256::new();
    hasher.update(statement.as_bytes());
    hasher.update(closes_at.as_millis().to_le_bytes());
    let digest = hasher.finalize();

    let mut id = [0u8; 16];
    id.copy_from_slice(&digest[..16]);
    MarketId(id)
}

impl Market {
    /// Create a market with reserves split evenly from the initial liquidity.
    pub fn create(
        params: MarketParams,
        authority: TraderId,
        now: Timestamp,
    ) -> Result<Self, MarketError> {
        if params.statement.is_empty() || params.statement.len() > MAX_STATEMENT_LEN {
            return Err(MarketError::InvalidParameters {
                reason: format!(
                    "statement must be 1..={} chars, got {}",
                    MAX_STATEMENT_LEN,
                    params.statement.len()
                ),
            });
        }
        if params.initial_liquidity <= Decimal::ZERO {
            return Err(MarketError::InvalidParameters {
                reason: format!("initial liquidity must be positive, got {}", params.initial_liquidity),
            });
        }
        let fee_bps = FeeBps::new(params.fee_bps).ok_or(MarketError::InvalidParameters {
            reason: format!("fee must be below 10000 bps, got {}", params.fee_bps),
        })?;
        if params.closes_at <= now {
            return Err(MarketError::InvalidParameters {
                reason: format!(
                    "close time {} is not in the future (now {})",
                    params.closes_at.as_millis(),
                    now.as_millis()
                ),
            });
        }

        let id = derive_market_id(&params.statement, params.closes_at);
        let half = params.initial_liquidity / Decimal::TWO;

        Ok(Self {
            id,
            statement: params.statement,
            authority,
            reserve_yes: half,
            reserve_no: half,
            liquidity: Collateral::new(params.initial_liquidity),
            fees_accrued: Collateral::zero(),
            total_paid_out: Collateral::zero(),
            fee_bps,
            status: MarketStatus::Active,
            outcome: None,
            closes_at: params.closes_at,
            created_at: now,
            resolved_at: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == MarketStatus::Active
    }

    pub fn is_resolved(&self) -> bool {
        self.status == MarketStatus::Resolved
    }

    /// Reject trades on resolved markets and past the close time.
    pub fn assert_tradable(&self, now: Timestamp) -> Result<(), MarketError> {
        if !self.is_active() || now >= self.closes_at {
            return Err(MarketError::MarketClosed(self.id));
        }
        Ok(())
    }

    /// Terminal transition. The authority may resolve at any time; once the
    /// market is past its close, any caller may resolve it.
    pub fn resolve(
        &mut self,
        outcome: Outcome,
        caller: TraderId,
        now: Timestamp,
    ) -> Result<(), MarketError> {
        if !self.is_active() {
            return Err(MarketError::AlreadyResolved(self.id));
        }
        if caller != self.authority && now < self.closes_at {
            return Err(MarketError::UnauthorizedResolution(self.id));
        }

        self.status = MarketStatus::Resolved;
        self.outcome = Some(outcome);
        self.resolved_at = Some(now);
        Ok(())
    }

    pub fn record_payout(&mut self, payout: Collateral) {
        self.total_paid_out = self.total_paid_out.add(payout);
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MarketError {
    #[error("invalid market parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("market {0} is closed to trading")]
    MarketClosed(MarketId),

    #[error("market {0} is already resolved")]
    AlreadyResolved(MarketId),

    #[error("market {0} is not resolved")]
    NotResolved(MarketId),

    #[error("caller is not authorized to resolve market {0} before close")]
    UnauthorizedResolution(MarketId),
}
