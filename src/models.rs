use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One price observation for the tracked asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    pub pct_change_24h: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Confirmation from the exchange that an order executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: Uuid,
    pub side: TradeSide,
    /// Executed quantity in SOL.
    pub quantity: f64,
    /// Execution price in USDC per SOL.
    pub price: f64,
    /// Total USDC moved by the fill.
    pub quote_amount: f64,
    pub timestamp: DateTime<Utc>,
    /// True for dry-run fills that never touched the chain.
    pub simulated: bool,
    /// On-chain transaction signature for live fills.
    pub signature: Option<String>,
}

impl Fill {
    pub fn summary(&self) -> String {
        let mode = if self.simulated { " (dry run)" } else { "" };
        format!(
            "{} {:.6} SOL @ ${:.4} (${:.2} USDC){}",
            self.side, self.quantity, self.price, self.quote_amount, mode
        )
    }
}
