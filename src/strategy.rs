//! Threshold decision rule. Pure function of the current price and the
//! strategy state; all side effects live in the services layer.

use crate::state::StrategyState;

/// Decision returned for each evaluated price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No position and price dropped to or below the buy threshold.
    Buy,
    /// Open position and price rose to or above the take-profit threshold.
    Sell,
    /// Take no action this cycle.
    Hold,
}

/// Evaluate the two threshold rules.
///
/// - Buy when flat and `price <= reference * (1 - buy_drop_pct / 100)`.
/// - Sell when holding and `price >= entry * (1 + take_profit_pct / 100)`.
///
/// Equality at either boundary triggers. With no reference price yet (first
/// cycles after startup) the only possible decision is `Hold`.
pub fn evaluate(current_price: f64, state: &StrategyState) -> Decision {
    if let Some(position) = &state.position {
        let target = position.entry_price * (1.0 + state.take_profit_pct / 100.0);
        if current_price >= target {
            return Decision::Sell;
        }
        return Decision::Hold;
    }

    match state.reference_price {
        Some(reference) if current_price <= reference * (1.0 - state.buy_drop_pct / 100.0) => {
            Decision::Buy
        }
        _ => Decision::Hold,
    }
}
