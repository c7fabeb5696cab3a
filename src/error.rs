//! Error taxonomy for the bot. Everything here is recoverable; only startup
//! failures (handled with `anyhow` in `main`) abort the process.

use thiserror::Error;

/// Price source failures. These skip the current monitor cycle.
#[derive(Error, Debug)]
pub enum PriceError {
    #[error("price source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed price response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for PriceError {
    fn from(err: reqwest::Error) -> Self {
        PriceError::Unavailable(err.to_string())
    }
}

/// Exchange failures. State is never mutated when one of these comes back.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("exchange request failed: {0}")]
    Network(String),

    #[error("transaction signing failed: {0}")]
    Signing(String),
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        ExchangeError::Network(err.to_string())
    }
}

/// Trade-level failures surfaced to the operator via the chat reply.
#[derive(Error, Debug)]
pub enum TradeError {
    #[error("a position is already open")]
    PositionAlreadyOpen,

    #[error("no open position to sell")]
    NoOpenPosition,

    #[error("price unavailable for this trade")]
    PriceUnavailable,

    #[error(transparent)]
    Order(#[from] ExchangeError),
}

/// Rejected parameter updates. State is left untouched.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}
