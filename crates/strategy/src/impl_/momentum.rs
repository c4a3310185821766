//! Momentum Ranking Strategy
//!
//! Ranks the universe by trailing return and holds the top `top_n` symbols
//! at equal weight, rebalancing every `rebalance_bars` bars. Between
//! rebalances it reports `hold_current`, which is what gives the book its
//! low-frequency cadence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::StrategyError;
use crate::traits::Strategy;
use meridian_types::StrategyOutput;

/// Momentum ranking parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumParams {
    /// Number of top-ranked symbols to hold
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Bars between rebalances
    #[serde(default = "default_rebalance_bars")]
    pub rebalance_bars: usize,
    /// Minimum trailing return to qualify for the book
    #[serde(default)]
    pub min_trailing_return: f64,
}

fn default_top_n() -> usize {
    2
}
fn default_rebalance_bars() -> usize {
    5
}

/// Momentum ranking strategy.
pub struct MomentumRanking {
    params: MomentumParams,
    bars_since_rebalance: Option<usize>,
}

impl MomentumRanking {
    /// Creates the strategy from JSON parameters.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidParams`] on malformed parameters.
    pub fn from_params(params: &serde_json::Value) -> Result<Self, StrategyError> {
        let params: MomentumParams = serde_json::from_value(params.clone())
            .map_err(|e| StrategyError::InvalidParams(e.to_string()))?;

        if params.top_n == 0 {
            return Err(StrategyError::InvalidParams(
                "top_n must be > 0".to_string(),
            ));
        }
        if params.rebalance_bars == 0 {
            return Err(StrategyError::InvalidParams(
                "rebalance_bars must be > 0".to_string(),
            ));
        }

        Ok(Self {
            params,
            bars_since_rebalance: None,
        })
    }

    fn pick_weights(&self, ctx: &Context) -> BTreeMap<String, f64> {
        let mut ranked: Vec<(&String, f64)> = ctx
            .features
            .iter()
            .map(|(symbol, features)| (symbol, features.trailing_return))
            .filter(|(_, ret)| ret.is_finite() && *ret > self.params.min_trailing_return)
            .collect();

        // Stable rank: return descending, symbol as tiebreak
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        ranked.truncate(self.params.top_n);

        if ranked.is_empty() {
            return BTreeMap::new();
        }

        #[allow(clippy::cast_precision_loss)]
        let weight = 1.0 / ranked.len() as f64;
        ranked
            .into_iter()
            .map(|(symbol, _)| (symbol.clone(), weight))
            .collect()
    }
}

impl Strategy for MomentumRanking {
    fn evaluate(&mut self, ctx: &Context) -> Result<StrategyOutput, StrategyError> {
        let due = match self.bars_since_rebalance {
            None => true,
            Some(elapsed) => elapsed + 1 >= self.params.rebalance_bars,
        };

        if !due {
            self.bars_since_rebalance = self.bars_since_rebalance.map(|e| e + 1);
            return Ok(StrategyOutput::hold(
                self.name(),
                ctx.timestamp_ns,
                ctx.current_exposures.clone(),
            ));
        }

        self.bars_since_rebalance = Some(0);
        Ok(StrategyOutput::rebalance(
            self.name(),
            ctx.timestamp_ns,
            self.pick_weights(ctx),
        ))
    }

    fn name(&self) -> &str {
        "momentum"
    }

    fn warmup_bars(&self) -> usize {
        1
    }

    fn reset(&mut self) {
        self.bars_since_rebalance = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AssetFeatures, Regime};
    use approx::assert_relative_eq;

    fn make_context(returns: &[(&str, f64)]) -> Context {
        Context {
            timestamp_ns: 0,
            features: returns
                .iter()
                .map(|(symbol, ret)| {
                    (
                        (*symbol).to_string(),
                        AssetFeatures {
                            last_close: 100.0,
                            trailing_return: *ret,
                            volatility: 0.01,
                        },
                    )
                })
                .collect(),
            regime: Regime::Sideways,
            budget_fraction: 1.0,
            current_exposures: BTreeMap::new(),
        }
    }

    fn make_strategy(top_n: usize, rebalance_bars: usize) -> MomentumRanking {
        MomentumRanking::from_params(&serde_json::json!({
            "top_n": top_n,
            "rebalance_bars": rebalance_bars,
        }))
        .unwrap()
    }

    #[test]
    fn test_picks_top_performers_equal_weight() {
        let mut strategy = make_strategy(2, 5);
        let ctx = make_context(&[("BTC", 0.10), ("ETH", 0.05), ("SOL", 0.01)]);

        let output = strategy.evaluate(&ctx).unwrap();
        assert!(!output.hold_current);
        assert_eq!(output.weights.len(), 2);
        assert_relative_eq!(output.weights["BTC"], 0.5, epsilon = 1e-12);
        assert_relative_eq!(output.weights["ETH"], 0.5, epsilon = 1e-12);
        assert!(!output.weights.contains_key("SOL"));
    }

    #[test]
    fn test_holds_between_rebalances() {
        let mut strategy = make_strategy(1, 3);
        let ctx = make_context(&[("BTC", 0.10)]);

        let first = strategy.evaluate(&ctx).unwrap();
        assert!(!first.hold_current);

        let second = strategy.evaluate(&ctx).unwrap();
        assert!(second.hold_current);
        let third = strategy.evaluate(&ctx).unwrap();
        assert!(third.hold_current);

        // Fourth bar: rebalance is due again
        let fourth = strategy.evaluate(&ctx).unwrap();
        assert!(!fourth.hold_current);
    }

    #[test]
    fn test_goes_flat_when_nothing_qualifies() {
        let mut strategy = MomentumRanking::from_params(&serde_json::json!({
            "top_n": 2,
            "rebalance_bars": 1,
            "min_trailing_return": 0.05,
        }))
        .unwrap();
        let ctx = make_context(&[("BTC", 0.01), ("ETH", -0.02)]);

        let output = strategy.evaluate(&ctx).unwrap();
        assert!(!output.hold_current);
        assert!(output.weights.is_empty());
    }

    #[test]
    fn test_rejects_zero_top_n() {
        let result = MomentumRanking::from_params(&serde_json::json!({"top_n": 0}));
        assert!(matches!(result, Err(StrategyError::InvalidParams(_))));
    }

    #[test]
    fn test_reset_forces_immediate_rebalance() {
        let mut strategy = make_strategy(1, 10);
        let ctx = make_context(&[("BTC", 0.10)]);

        strategy.evaluate(&ctx).unwrap();
        assert!(strategy.evaluate(&ctx).unwrap().hold_current);

        strategy.reset();
        assert!(!strategy.evaluate(&ctx).unwrap().hold_current);
    }
}
