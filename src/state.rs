use crate::api_client::PriceSource;
use crate::error::ValidationError;
use crate::exchange::ExchangeClient;
use crate::models::{Fill, TradeSide};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The currently held position. Existence of this struct is the
/// "position open" flag: entry price and quantity are only ever defined
/// together with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_price: f64,
    /// Held quantity in SOL.
    pub quantity: f64,
    pub opened_at: DateTime<Utc>,
}

/// Strategy parameters and position, mutated by the monitor loop and the
/// command handlers. Lives behind a single `Mutex` (see [`AppState`]) so a
/// read-decide-write around a trade is one critical section.
#[derive(Debug, Clone)]
pub struct StrategyState {
    /// Baseline from which a drop is measured. Unset until the first
    /// successful price fetch, reset to the fill price after every trade.
    pub reference_price: Option<f64>,
    pub buy_drop_pct: f64,
    pub take_profit_pct: f64,
    pub position: Option<Position>,
    pub trade_history: Vec<Fill>,
}

impl StrategyState {
    pub fn new(buy_drop_pct: f64, take_profit_pct: f64) -> Result<Self, ValidationError> {
        if buy_drop_pct <= 0.0 {
            return Err(ValidationError::NonPositive {
                name: "buy_drop_pct",
                value: buy_drop_pct,
            });
        }
        if take_profit_pct <= 0.0 {
            return Err(ValidationError::NonPositive {
                name: "take_profit_pct",
                value: take_profit_pct,
            });
        }
        Ok(Self {
            reference_price: None,
            buy_drop_pct,
            take_profit_pct,
            position: None,
            trade_history: Vec::new(),
        })
    }

    pub fn position_open(&self) -> bool {
        self.position.is_some()
    }

    pub fn set_buy_drop_pct(&mut self, value: f64) -> Result<(), ValidationError> {
        if value <= 0.0 {
            return Err(ValidationError::NonPositive {
                name: "buy_drop_pct",
                value,
            });
        }
        self.buy_drop_pct = value;
        Ok(())
    }

    pub fn set_take_profit_pct(&mut self, value: f64) -> Result<(), ValidationError> {
        if value <= 0.0 {
            return Err(ValidationError::NonPositive {
                name: "take_profit_pct",
                value,
            });
        }
        self.take_profit_pct = value;
        Ok(())
    }

    /// Apply a confirmed fill: open or close the position, reset the
    /// reference price to the fill price, and record the trade. Callers only
    /// invoke this after the exchange reported success, never optimistically.
    pub fn apply_fill(&mut self, fill: &Fill) {
        match fill.side {
            TradeSide::Buy => {
                self.position = Some(Position {
                    entry_price: fill.price,
                    quantity: fill.quantity,
                    opened_at: fill.timestamp,
                });
            }
            TradeSide::Sell => {
                self.position = None;
            }
        }
        self.reference_price = Some(fill.price);
        self.trade_history.push(fill.clone());
    }
}

/// Shared application state handed to both activity sources: the periodic
/// monitor task and the Telegram command handlers.
#[derive(Clone)]
pub struct AppState {
    pub strategy: Arc<Mutex<StrategyState>>,
    pub prices: Arc<dyn PriceSource>,
    pub exchange: Arc<dyn ExchangeClient>,
    /// USDC spent per automatic or manual buy.
    pub trade_amount_usdc: f64,
}

impl AppState {
    pub fn new(
        strategy: StrategyState,
        prices: Arc<dyn PriceSource>,
        exchange: Arc<dyn ExchangeClient>,
        trade_amount_usdc: f64,
    ) -> Self {
        Self {
            strategy: Arc::new(Mutex::new(strategy)),
            prices,
            exchange,
            trade_amount_usdc,
        }
    }
}
