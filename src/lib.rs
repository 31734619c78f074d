// pm-core: binary prediction market engine.
// invariant-first architecture: pool solvency and price coherence take priority.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: MarketId, Side, Outcome, Price, Collateral
//   2.x  market.rs: market lifecycle: create, close, resolve
//   3.x  pricing.rs: constant-sum AMM quoting for buys and sells
//   3.5  trade.rs: quote commit against pool reserves, trade records
//   4.x  position.rs: per-side share ledger, basis release, settlement
//   4.5  trader.rs: trader records and running totals
//   5.x  engine/: core engine: markets, trades, resolution, settlement
//   6.x  events.rs: state transition events for audit

pub mod engine;
pub mod events;
pub mod market;
pub mod position;
pub mod pricing;
pub mod trade;
pub mod trader;
pub mod types;

// re exports for convenience
pub use engine::*;
pub use events::*;
pub use market::*;
pub use position::*;
pub use pricing::*;
pub use trade::{Trade, TradeDirection, TradeError};
pub use trader::*;
pub use types::*;
