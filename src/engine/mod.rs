// 5.0: core market engine. coordinates market creation, quote-then-commit
// trade execution, position updates, resolution, and settlement.
// deterministic and event-driven with no external I/O.

mod config;
mod core;
mod resolution;
mod results;
mod trades;

pub use config::EngineConfig;
pub use core::Engine;
pub use results::{BuyResult, EngineError, SellResult, SettlementResult};
