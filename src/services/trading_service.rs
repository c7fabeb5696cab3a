use crate::error::TradeError;
use crate::models::{Fill, PriceQuote};
use crate::state::AppState;
use crate::strategy::{self, Decision};
use tracing::info;

/// Evaluate the threshold rules against a fresh quote and execute the
/// resulting decision, if any.
///
/// The whole read-decide-write runs under the strategy lock: the decision,
/// the exchange call and the post-fill state update are one critical
/// section, so a manual command racing the monitor cannot act on the same
/// position twice. State changes only after the exchange confirms the fill.
pub async fn try_auto_trade(
    state: &AppState,
    quote: &PriceQuote,
) -> Result<Option<Fill>, TradeError> {
    let mut strategy_state = state.strategy.lock().await;

    // First successful fetch after startup seeds the reference price.
    if strategy_state.reference_price.is_none() && !strategy_state.position_open() {
        strategy_state.reference_price = Some(quote.price);
        info!("Reference price initialised to ${:.4}", quote.price);
        return Ok(None);
    }

    match strategy::evaluate(quote.price, &strategy_state) {
        Decision::Hold => Ok(None),
        Decision::Buy => {
            let fill = state
                .exchange
                .buy(state.trade_amount_usdc, quote.price)
                .await?;
            strategy_state.apply_fill(&fill);
            Ok(Some(fill))
        }
        Decision::Sell => {
            // evaluate only emits Sell while a position is open.
            let quantity = match &strategy_state.position {
                Some(position) => position.quantity,
                None => return Ok(None),
            };
            let fill = state.exchange.sell(quantity, quote.price).await?;
            strategy_state.apply_fill(&fill);
            Ok(Some(fill))
        }
    }
}

/// Manual market buy of the configured USDC amount, bypassing the evaluator.
/// Rejected while a position is already open.
pub async fn manual_buy(state: &AppState) -> Result<Fill, TradeError> {
    let mut strategy_state = state.strategy.lock().await;

    if strategy_state.position_open() {
        return Err(TradeError::PositionAlreadyOpen);
    }

    let quote = state
        .prices
        .get_price()
        .await
        .map_err(|_| TradeError::PriceUnavailable)?;

    let fill = state
        .exchange
        .buy(state.trade_amount_usdc, quote.price)
        .await?;
    strategy_state.apply_fill(&fill);
    Ok(fill)
}

/// Manual market sell of the whole open position, bypassing the evaluator.
/// A no-op error when there is nothing to sell.
pub async fn manual_sell(state: &AppState) -> Result<Fill, TradeError> {
    let mut strategy_state = state.strategy.lock().await;

    let quantity = strategy_state
        .position
        .as_ref()
        .ok_or(TradeError::NoOpenPosition)?
        .quantity;

    let quote = state
        .prices
        .get_price()
        .await
        .map_err(|_| TradeError::PriceUnavailable)?;

    let fill = state.exchange.sell(quantity, quote.price).await?;
    strategy_state.apply_fill(&fill);
    Ok(fill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::PriceSource;
    use crate::error::{ExchangeError, PriceError};
    use crate::exchange::{ExchangeClient, PaperExchange};
    use crate::models::TradeSide;
    use crate::state::StrategyState;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;

    struct StaticPrices(f64);

    #[async_trait]
    impl PriceSource for StaticPrices {
        async fn get_price(&self) -> Result<PriceQuote, PriceError> {
            Ok(quote(self.0))
        }
    }

    struct DownPrices;

    #[async_trait]
    impl PriceSource for DownPrices {
        async fn get_price(&self) -> Result<PriceQuote, PriceError> {
            Err(PriceError::Unavailable("connection refused".to_string()))
        }
    }

    struct FailingExchange;

    #[async_trait]
    impl ExchangeClient for FailingExchange {
        async fn buy(&self, _quote_amount: f64, _mark_price: f64) -> Result<Fill, ExchangeError> {
            Err(ExchangeError::Rejected("exchange down".to_string()))
        }

        async fn sell(&self, _base_quantity: f64, _mark_price: f64) -> Result<Fill, ExchangeError> {
            Err(ExchangeError::Rejected("exchange down".to_string()))
        }
    }

    fn quote(price: f64) -> PriceQuote {
        PriceQuote {
            price,
            pct_change_24h: 0.0,
            timestamp: Utc::now(),
        }
    }

    fn paper_state(price: f64) -> AppState {
        AppState::new(
            StrategyState::new(5.0, 10.0).unwrap(),
            Arc::new(StaticPrices(price)),
            Arc::new(PaperExchange),
            5.0,
        )
    }

    #[tokio::test]
    async fn test_first_quote_seeds_reference_price() {
        let state = paper_state(100.0);

        let fill = try_auto_trade(&state, &quote(100.0)).await.unwrap();
        assert!(fill.is_none());

        let strategy_state = state.strategy.lock().await;
        assert_eq!(strategy_state.reference_price, Some(100.0));
    }

    #[tokio::test]
    async fn test_drop_triggers_buy_then_rise_triggers_sell() {
        let state = paper_state(100.0);

        // Seed the reference at 100.
        try_auto_trade(&state, &quote(100.0)).await.unwrap();

        // 5% drop: buy fires and opens the position at 95.
        let fill = try_auto_trade(&state, &quote(95.0))
            .await
            .unwrap()
            .expect("buy should fire");
        assert_eq!(fill.side, TradeSide::Buy);
        assert_eq!(fill.price, 95.0);
        {
            let strategy_state = state.strategy.lock().await;
            let position = strategy_state.position.as_ref().unwrap();
            assert_eq!(position.entry_price, 95.0);
        }

        // 10% take profit above 95 is 104.5: sell fires and closes.
        let fill = try_auto_trade(&state, &quote(104.5))
            .await
            .unwrap()
            .expect("sell should fire");
        assert_eq!(fill.side, TradeSide::Sell);
        let strategy_state = state.strategy.lock().await;
        assert!(!strategy_state.position_open());
        assert_eq!(strategy_state.reference_price, Some(104.5));
        assert_eq!(strategy_state.trade_history.len(), 2);
    }

    #[tokio::test]
    async fn test_hold_between_thresholds_executes_nothing() {
        let state = paper_state(100.0);
        try_auto_trade(&state, &quote(100.0)).await.unwrap();

        assert!(try_auto_trade(&state, &quote(98.0)).await.unwrap().is_none());
        assert!(try_auto_trade(&state, &quote(102.0)).await.unwrap().is_none());

        let strategy_state = state.strategy.lock().await;
        assert!(strategy_state.trade_history.is_empty());
    }

    #[tokio::test]
    async fn test_order_failure_leaves_state_unchanged() {
        let state = AppState::new(
            StrategyState::new(5.0, 10.0).unwrap(),
            Arc::new(StaticPrices(95.0)),
            Arc::new(FailingExchange),
            5.0,
        );
        try_auto_trade(&state, &quote(100.0)).await.unwrap();

        let result = try_auto_trade(&state, &quote(95.0)).await;
        assert!(matches!(result, Err(TradeError::Order(_))));

        let strategy_state = state.strategy.lock().await;
        assert!(!strategy_state.position_open());
        assert_eq!(strategy_state.reference_price, Some(100.0));
        assert!(strategy_state.trade_history.is_empty());
    }

    #[tokio::test]
    async fn test_manual_buy_rejected_while_position_open() {
        let state = paper_state(100.0);
        manual_buy(&state).await.unwrap();

        let result = manual_buy(&state).await;
        assert!(matches!(result, Err(TradeError::PositionAlreadyOpen)));

        let strategy_state = state.strategy.lock().await;
        assert_eq!(strategy_state.trade_history.len(), 1);
    }

    #[tokio::test]
    async fn test_manual_sell_without_position_is_a_no_op() {
        let state = paper_state(100.0);
        let result = manual_sell(&state).await;
        assert!(matches!(result, Err(TradeError::NoOpenPosition)));
    }

    #[tokio::test]
    async fn test_manual_trade_fails_when_price_source_down() {
        let state = AppState::new(
            StrategyState::new(5.0, 10.0).unwrap(),
            Arc::new(DownPrices),
            Arc::new(PaperExchange),
            5.0,
        );

        let result = manual_buy(&state).await;
        assert!(matches!(result, Err(TradeError::PriceUnavailable)));

        let strategy_state = state.strategy.lock().await;
        assert!(!strategy_state.position_open());
    }

    #[tokio::test]
    async fn test_concurrent_sells_execute_exactly_once() {
        let state = paper_state(104.5);
        manual_buy(&state).await.unwrap();
        {
            // Rewind the entry to 95 so 104.5 is past the 10% take profit.
            let mut strategy_state = state.strategy.lock().await;
            let position = strategy_state.position.as_mut().unwrap();
            position.entry_price = 95.0;
        }

        // A manual sell and an automatic take-profit race for the same
        // position; the strategy lock serialises them.
        let sell_quote = quote(104.5);
        let auto = try_auto_trade(&state, &sell_quote);
        let manual = manual_sell(&state);
        let (auto_result, manual_result) = tokio::join!(auto, manual);

        let auto_sold = matches!(auto_result, Ok(Some(_)));
        let manual_sold = manual_result.is_ok();
        assert!(
            auto_sold ^ manual_sold,
            "exactly one sell must execute (auto: {auto_sold}, manual: {manual_sold})"
        );
        if !manual_sold {
            assert!(matches!(manual_result, Err(TradeError::NoOpenPosition)));
        }

        let strategy_state = state.strategy.lock().await;
        assert!(!strategy_state.position_open());
        // One buy plus exactly one sell.
        assert_eq!(strategy_state.trade_history.len(), 2);
    }
}
