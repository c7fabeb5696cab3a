pub mod jupiter;

pub use jupiter::JupiterExchange;

use crate::error::ExchangeError;
use crate::models::{Fill, TradeSide};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

/// Market order execution for the SOL/USDC pair.
///
/// `mark_price` is the price the decision was made against; the paper
/// implementation fills at it, the live implementation fills at whatever
/// Jupiter quotes.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Spend `quote_amount` USDC buying SOL.
    async fn buy(&self, quote_amount: f64, mark_price: f64) -> Result<Fill, ExchangeError>;

    /// Sell `base_quantity` SOL for USDC.
    async fn sell(&self, base_quantity: f64, mark_price: f64) -> Result<Fill, ExchangeError>;
}

/// Dry-run exchange: fills instantly at the mark price without touching the
/// chain. This is the default mode, matching `DRY_RUN=true`.
pub struct PaperExchange;

#[async_trait]
impl ExchangeClient for PaperExchange {
    async fn buy(&self, quote_amount: f64, mark_price: f64) -> Result<Fill, ExchangeError> {
        if quote_amount <= 0.0 || mark_price <= 0.0 {
            return Err(ExchangeError::Rejected(format!(
                "cannot fill buy of {quote_amount} USDC at ${mark_price}"
            )));
        }

        Ok(Fill {
            order_id: Uuid::new_v4(),
            side: TradeSide::Buy,
            quantity: quote_amount / mark_price,
            price: mark_price,
            quote_amount,
            timestamp: Utc::now(),
            simulated: true,
            signature: None,
        })
    }

    async fn sell(&self, base_quantity: f64, mark_price: f64) -> Result<Fill, ExchangeError> {
        if base_quantity <= 0.0 || mark_price <= 0.0 {
            return Err(ExchangeError::Rejected(format!(
                "cannot fill sell of {base_quantity} SOL at ${mark_price}"
            )));
        }

        Ok(Fill {
            order_id: Uuid::new_v4(),
            side: TradeSide::Sell,
            quantity: base_quantity,
            price: mark_price,
            quote_amount: base_quantity * mark_price,
            timestamp: Utc::now(),
            simulated: true,
            signature: None,
        })
    }
}
