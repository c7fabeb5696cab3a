use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::error;

use crate::services::trading_service;
use crate::state::AppState;
use crate::telegram::commands::Command;

/// Handle one incoming operator command.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: AppState,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;

    match cmd {
        Command::Start => {
            bot.send_message(
                chat_id,
                "SOL trader bot running. Watching SOL/USDC: buys on a configured \
                 drop below the reference price, sells on a configured rise above \
                 the entry price. Try /status or /help.",
            )
            .await?;
        }
        Command::Status => {
            let text = status_text(&state).await;
            bot.send_message(chat_id, text).await?;
        }
        Command::Setbuy { pct } => {
            let mut strategy_state = state.strategy.lock().await;
            match strategy_state.set_buy_drop_pct(pct) {
                Ok(()) => {
                    bot.send_message(chat_id, format!("Buy drop set to {pct}%"))
                        .await?;
                }
                Err(err) => {
                    bot.send_message(chat_id, format!("Rejected: {err}")).await?;
                }
            }
        }
        Command::Settp { pct } => {
            let mut strategy_state = state.strategy.lock().await;
            match strategy_state.set_take_profit_pct(pct) {
                Ok(()) => {
                    bot.send_message(chat_id, format!("Take profit set to {pct}%"))
                        .await?;
                }
                Err(err) => {
                    bot.send_message(chat_id, format!("Rejected: {err}")).await?;
                }
            }
        }
        Command::Buy => match trading_service::manual_buy(&state).await {
            Ok(fill) => {
                bot.send_message(chat_id, format!("Bought: {}", fill.summary()))
                    .await?;
            }
            Err(err) => {
                error!("Manual buy failed: {err}");
                bot.send_message(chat_id, format!("Buy failed: {err}")).await?;
            }
        },
        Command::Sell => match trading_service::manual_sell(&state).await {
            Ok(fill) => {
                bot.send_message(chat_id, format!("Sold: {}", fill.summary()))
                    .await?;
            }
            Err(err) => {
                error!("Manual sell failed: {err}");
                bot.send_message(chat_id, format!("Sell failed: {err}"))
                    .await?;
            }
        },
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
    }

    Ok(())
}

/// Render the /status reply: fresh price plus the strategy snapshot.
async fn status_text(state: &AppState) -> String {
    let price_line = match state.prices.get_price().await {
        Ok(quote) => format!(
            "price: ${:.4} ({:+.2}% 24h)",
            quote.price, quote.pct_change_24h
        ),
        Err(err) => format!("price: unavailable ({err})"),
    };

    let strategy_state = state.strategy.lock().await;

    let reference_line = match strategy_state.reference_price {
        Some(reference) => format!("reference: ${reference:.4}"),
        None => "reference: not set yet".to_string(),
    };

    let position_line = match &strategy_state.position {
        Some(position) => format!(
            "position: {:.6} SOL @ ${:.4} (opened {})",
            position.quantity,
            position.entry_price,
            position.opened_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => "position: none".to_string(),
    };

    format!(
        "SOL/USDC status\n{price_line}\n{reference_line}\nbuy drop: {}% | take profit: {}%\n{position_line}\ntrades executed: {}",
        strategy_state.buy_drop_pct,
        strategy_state.take_profit_pct,
        strategy_state.trade_history.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::PriceSource;
    use crate::error::PriceError;
    use crate::exchange::PaperExchange;
    use crate::models::PriceQuote;
    use crate::state::StrategyState;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;

    struct StaticPrices(f64);

    #[async_trait]
    impl PriceSource for StaticPrices {
        async fn get_price(&self) -> Result<PriceQuote, PriceError> {
            Ok(PriceQuote {
                price: self.0,
                pct_change_24h: 1.5,
                timestamp: Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn test_status_text_reports_thresholds_and_position() {
        let state = AppState::new(
            StrategyState::new(5.0, 2.0).unwrap(),
            Arc::new(StaticPrices(147.32)),
            Arc::new(PaperExchange),
            5.0,
        );

        let text = status_text(&state).await;
        assert!(text.contains("price: $147.3200"));
        assert!(text.contains("reference: not set yet"));
        assert!(text.contains("buy drop: 5% | take profit: 2%"));
        assert!(text.contains("position: none"));

        trading_service::manual_buy(&state).await.unwrap();
        let text = status_text(&state).await;
        // 5 USDC / 147.32 = 0.03393972 SOL
        assert!(text.contains("position: 0.033940 SOL"));
        assert!(text.contains("trades executed: 1"));
    }
}
