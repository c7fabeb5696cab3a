use crate::error::PriceError;
use crate::models::PriceQuote;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of the current price and 24h change for the tracked asset.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn get_price(&self) -> Result<PriceQuote, PriceError>;
}

/// Entry from the CoinGecko `/coins/markets` endpoint.
#[derive(Deserialize)]
struct MarketEntry {
    current_price: f64,
    price_change_percentage_24h: Option<f64>,
}

pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_COINGECKO_URL.to_string()),
        }
    }

    fn parse_markets(body: &[MarketEntry]) -> Result<PriceQuote, PriceError> {
        let entry = body
            .first()
            .ok_or_else(|| PriceError::Malformed("empty markets response".to_string()))?;

        Ok(PriceQuote {
            price: entry.current_price,
            pct_change_24h: entry.price_change_percentage_24h.unwrap_or(0.0),
            timestamp: Utc::now(),
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn get_price(&self) -> Result<PriceQuote, PriceError> {
        let url = format!("{}/coins/markets", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("ids", "solana"),
                ("per_page", "1"),
                ("page", "1"),
                ("price_change_percentage", "24h"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Vec<MarketEntry> = response
            .json()
            .await
            .map_err(|e| PriceError::Malformed(e.to_string()))?;

        Self::parse_markets(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markets_response() {
        let body: Vec<MarketEntry> = serde_json::from_str(
            r#"[{"id":"solana","current_price":147.32,"price_change_percentage_24h":-2.15}]"#,
        )
        .unwrap();

        let quote = CoinGeckoClient::parse_markets(&body).unwrap();
        assert_eq!(quote.price, 147.32);
        assert_eq!(quote.pct_change_24h, -2.15);
    }

    #[test]
    fn test_parse_markets_missing_change_defaults_to_zero() {
        let body: Vec<MarketEntry> =
            serde_json::from_str(r#"[{"id":"solana","current_price":147.32}]"#).unwrap();

        let quote = CoinGeckoClient::parse_markets(&body).unwrap();
        assert_eq!(quote.pct_change_24h, 0.0);
    }

    #[test]
    fn test_parse_markets_rejects_empty_response() {
        let result = CoinGeckoClient::parse_markets(&[]);
        assert!(matches!(result, Err(PriceError::Malformed(_))));
    }
}
