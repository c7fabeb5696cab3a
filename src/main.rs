mod api_client;
mod config;
mod error;
mod exchange;
mod models;
mod services;
mod state;
mod strategy;
mod telegram;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api_client::{CoinGeckoClient, PriceSource};
use crate::config::Config;
use crate::exchange::{ExchangeClient, JupiterExchange, PaperExchange};
use crate::state::{AppState, StrategyState};
use crate::telegram::{handle_command, AuthorizedUsers, Command, Notifier};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("invalid configuration")?;

    let prices: Arc<dyn PriceSource> =
        Arc::new(CoinGeckoClient::new(config.coingecko_url.clone()));

    let exchange: Arc<dyn ExchangeClient> = if config.dry_run {
        info!("DRY_RUN enabled: orders are simulated, nothing touches the chain");
        Arc::new(PaperExchange)
    } else {
        let key = config
            .private_key_b58
            .as_deref()
            .context("PRIVATE_KEY_B58 must be set when DRY_RUN=false")?;
        info!("Live trading via Jupiter against {}", config.rpc_url);
        Arc::new(JupiterExchange::new(
            &config.rpc_url,
            key,
            config.slippage_bps,
        )?)
    };

    let strategy_state = StrategyState::new(config.buy_drop_pct, config.take_profit_pct)
        .map_err(|e| anyhow::anyhow!("invalid thresholds: {e}"))?;
    let state = AppState::new(strategy_state, prices, exchange, config.trade_amount_usdc);

    let authorized_users = AuthorizedUsers::from_list(&config.authorized_users)?;
    if authorized_users.is_empty() {
        warn!("TELEGRAM_AUTHORIZED_USERS is empty; all commands will be rejected");
    }
    if config.admin_chat_id.is_none() {
        warn!("TELEGRAM_ADMIN_CHAT_ID not set; trade notifications disabled");
    }

    let bot = Bot::new(config.telegram_token.clone());
    let notifier = Notifier::new(bot.clone(), config.admin_chat_id);

    // Background monitor task, tied to process lifetime.
    let monitor_state = state.clone();
    let monitor_notifier = notifier.clone();
    let poll_interval = Duration::from_secs(config.poll_interval_secs);
    tokio::spawn(async move {
        services::monitor_service::run_monitor_loop(monitor_state, monitor_notifier, poll_interval)
            .await;
    });

    let handler = Update::filter_message()
        .filter_map(|update: Update| update.from().map(|user| user.id))
        .filter(move |user_id: teloxide::types::UserId| {
            let authorized = authorized_users.is_authorized(&user_id);
            if !authorized {
                warn!("Unauthorized access attempt from user {user_id}");
            }
            authorized
        })
        .filter_command::<Command>()
        .endpoint({
            let state = state.clone();
            move |bot: Bot, msg: Message, cmd: Command| {
                let state = state.clone();
                async move { handle_command(bot, msg, cmd, state).await }
            }
        });

    info!("Starting Telegram dispatcher");
    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
