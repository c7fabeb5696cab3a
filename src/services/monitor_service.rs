use crate::services::trading_service;
use crate::state::AppState;
use crate::telegram::Notifier;
use std::time::Duration;
use tokio::time;
use tracing::{error, info, warn};

/// Periodic monitor: fetch the price, evaluate the thresholds, trade.
/// Spawned once at startup and lives until process shutdown.
pub async fn run_monitor_loop(state: AppState, notifier: Notifier, poll_interval: Duration) {
    let mut interval = time::interval(poll_interval);

    info!("Starting price monitor ({}s interval)", poll_interval.as_secs());

    loop {
        interval.tick().await;
        poll_once(&state, &notifier).await;
    }
}

/// One monitor cycle. A failed price fetch skips the cycle; a failed order
/// leaves the state untouched and notifies the operator. Neither ends the
/// loop, and a failed decision is simply re-evaluated next cycle.
pub async fn poll_once(state: &AppState, notifier: &Notifier) {
    let quote = match state.prices.get_price().await {
        Ok(quote) => quote,
        Err(err) => {
            warn!("Price fetch failed, skipping cycle: {err}");
            return;
        }
    };

    info!(
        "SOL price ${:.4}, 24h change {:+.2}%",
        quote.price, quote.pct_change_24h
    );

    match trading_service::try_auto_trade(state, &quote).await {
        Ok(None) => {}
        Ok(Some(fill)) => {
            info!("Executed automatic trade: {}", fill.summary());
            notifier
                .send(format!("Automatic trade: {}", fill.summary()))
                .await;
        }
        Err(err) => {
            error!("Automatic trade failed: {err}");
            notifier
                .send(format!("Automatic trade failed: {err}"))
                .await;
        }
    }
}
