// 5.1: main engine struct. all state lives here: markets, traders, the
// append-only trade log, and the bounded event log.
//
// the engine is the unit of mutual exclusion: every mutating operation takes
// &mut self, so trades against its markets are serialized by construction.
// callers wanting per-market parallelism shard markets across engines.

use super::config::EngineConfig;
use super::results::EngineError;
use crate::events::{Event, EventId, EventPayload, MarketCreatedEvent};
use crate::market::{Market, MarketError, MarketParams};
use crate::trade::Trade;
use crate::trader::Trader;
use crate::types::{MarketId, Price, Timestamp, TradeId, TraderId};
use std::collections::HashMap;

#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) markets: HashMap<MarketId, Market>,
    pub(super) traders: HashMap<TraderId, Trader>,
    pub(super) trades: Vec<Trade>,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) next_trade_id: u64,
    pub(super) current_time: Timestamp,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            markets: HashMap::new(),
            traders: HashMap::new(),
            trades: Vec::new(),
            events: Vec::new(),
            next_event_id: 1,
            next_trade_id: 1,
            current_time: Timestamp::from_millis(0),
        }
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    /// Create a market owned by `authority`. The id is derived from the
    /// statement and close time, so re-creating the same question is rejected
    /// rather than silently replacing the live market.
    pub fn create_market(
        &mut self,
        params: MarketParams,
        authority: TraderId,
    ) -> Result<MarketId, EngineError> {
        if !self.traders.contains_key(&authority) {
            return Err(EngineError::TraderNotFound(authority));
        }

        let market = Market::create(params, authority, self.current_time)?;
        let market_id = market.id;
        if self.markets.contains_key(&market_id) {
            return Err(MarketError::InvalidParameters {
                reason: format!("market {market_id} already exists"),
            }
            .into());
        }

        self.emit_event(EventPayload::MarketCreated(MarketCreatedEvent {
            market_id,
            statement: market.statement.clone(),
            authority,
            initial_liquidity: market.liquidity.value(),
            fee_bps: market.fee_bps.value(),
            closes_at: market.closes_at,
        }));

        self.markets.insert(market_id, market);
        Ok(market_id)
    }

    pub fn create_trader(&mut self) -> TraderId {
        let id = TraderId(self.traders.len() as u64 + 1);
        let trader = Trader::new(id, self.current_time);
        self.traders.insert(id, trader);
        id
    }

    pub fn get_market(&self, market_id: MarketId) -> Option<&Market> {
        self.markets.get(&market_id)
    }

    pub fn get_trader(&self, trader_id: TraderId) -> Option<&Trader> {
        self.traders.get(&trader_id)
    }

    pub fn traders_iter(&self) -> impl Iterator<Item = (&TraderId, &Trader)> {
        self.traders.iter()
    }

    /// Current (YES, NO) prices for a market, frozen values once resolved.
    pub fn prices(&self, market_id: MarketId) -> Result<(Price, Price), EngineError> {
        let market = self
            .markets
            .get(&market_id)
            .ok_or(EngineError::MarketNotFound(market_id))?;
        Ok(crate::pricing::price(market.reserve_yes, market.reserve_no))
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn trades_for_market(&self, market_id: MarketId) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(move |t| t.market_id == market_id)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub(super) fn next_trade_id(&mut self) -> TradeId {
        let id = TradeId(self.next_trade_id);
        self.next_trade_id += 1;
        id
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            println!("[Event {}] {:?}", event.id.0, event.payload);
        }

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
