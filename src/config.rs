use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;

/// Runtime configuration, loaded once from the environment (a `.env` file is
/// honoured via `dotenvy` in `main`).
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    /// Comma-separated Telegram user IDs allowed to issue commands.
    pub authorized_users: String,
    /// Chat that receives push notifications for automatic trades.
    pub admin_chat_id: Option<i64>,
    pub coingecko_url: Option<String>,
    pub rpc_url: String,
    pub private_key_b58: Option<String>,
    pub dry_run: bool,
    pub poll_interval_secs: u64,
    pub buy_drop_pct: f64,
    pub take_profit_pct: f64,
    pub trade_amount_usdc: f64,
    pub slippage_bps: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let telegram_token =
            env::var("TELEGRAM_TOKEN").context("TELEGRAM_TOKEN must be set")?;

        let config = Self {
            telegram_token,
            authorized_users: env::var("TELEGRAM_AUTHORIZED_USERS").unwrap_or_default(),
            admin_chat_id: parse_optional("TELEGRAM_ADMIN_CHAT_ID")?,
            coingecko_url: env::var("COINGECKO_URL").ok(),
            rpc_url: env::var("RPC_URL")
                .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string()),
            private_key_b58: env::var("PRIVATE_KEY_B58").ok(),
            dry_run: parse_or("DRY_RUN", true)?,
            poll_interval_secs: parse_or("POLL_INTERVAL_SECS", 60)?,
            buy_drop_pct: parse_or("BUY_DROP_PCT", 5.0)?,
            take_profit_pct: parse_or("TAKE_PROFIT_PCT", 2.0)?,
            trade_amount_usdc: parse_or("TRADE_AMOUNT_USDC", 5.0)?,
            slippage_bps: parse_or("SLIPPAGE_BPS", 100)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.buy_drop_pct <= 0.0 {
            bail!("BUY_DROP_PCT must be positive, got {}", self.buy_drop_pct);
        }
        if self.take_profit_pct <= 0.0 {
            bail!(
                "TAKE_PROFIT_PCT must be positive, got {}",
                self.take_profit_pct
            );
        }
        if self.trade_amount_usdc <= 0.0 {
            bail!(
                "TRADE_AMOUNT_USDC must be positive, got {}",
                self.trade_amount_usdc
            );
        }
        if self.poll_interval_secs == 0 {
            bail!("POLL_INTERVAL_SECS must be at least 1");
        }
        if !self.dry_run && self.private_key_b58.is_none() {
            bail!("PRIVATE_KEY_B58 must be set when DRY_RUN=false");
        }
        Ok(())
    }
}

/// Parse an env var, falling back to a default when it is unset.
fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {name}={raw}: {e}")),
        Err(_) => Ok(default),
    }
}

fn parse_optional<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid {name}={raw}: {e}")),
        Err(_) => Ok(None),
    }
}
