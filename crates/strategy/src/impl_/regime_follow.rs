//! Regime Following Strategy
//!
//! Fully invested (equal weight) while the regime is trending up, flat while
//! trending down, holding whatever it has while sideways. Only acts on
//! regime *transitions*, so a stable regime produces a quiet book.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::{Context, Regime};
use crate::error::StrategyError;
use crate::traits::Strategy;
use meridian_types::StrategyOutput;

/// Regime following parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeFollowParams {
    /// Fraction of the budget deployed while trending up
    #[serde(default = "default_invest_fraction")]
    pub invest_fraction: f64,
}

fn default_invest_fraction() -> f64 {
    1.0
}

/// Regime following strategy.
pub struct RegimeFollow {
    params: RegimeFollowParams,
    last_regime: Option<Regime>,
}

impl RegimeFollow {
    /// Creates the strategy from JSON parameters.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidParams`] on malformed parameters.
    pub fn from_params(params: &serde_json::Value) -> Result<Self, StrategyError> {
        let params: RegimeFollowParams = serde_json::from_value(params.clone())
            .map_err(|e| StrategyError::InvalidParams(e.to_string()))?;

        if !(0.0..=1.0).contains(&params.invest_fraction) {
            return Err(StrategyError::InvalidParams(
                "invest_fraction must be within [0, 1]".to_string(),
            ));
        }

        Ok(Self {
            params,
            last_regime: None,
        })
    }

    fn equal_weights(&self, ctx: &Context) -> BTreeMap<String, f64> {
        if ctx.features.is_empty() {
            return BTreeMap::new();
        }
        #[allow(clippy::cast_precision_loss)]
        let weight = self.params.invest_fraction / ctx.features.len() as f64;
        ctx.features
            .keys()
            .map(|symbol| (symbol.clone(), weight))
            .collect()
    }
}

impl Strategy for RegimeFollow {
    fn evaluate(&mut self, ctx: &Context) -> Result<StrategyOutput, StrategyError> {
        let transitioned = self.last_regime != Some(ctx.regime);
        self.last_regime = Some(ctx.regime);

        if !transitioned {
            return Ok(StrategyOutput::hold(
                self.name(),
                ctx.timestamp_ns,
                ctx.current_exposures.clone(),
            ));
        }

        let weights = match ctx.regime {
            Regime::TrendingUp => self.equal_weights(ctx),
            Regime::TrendingDown => BTreeMap::new(),
            // A transition *into* sideways keeps the current book
            Regime::Sideways => {
                return Ok(StrategyOutput::hold(
                    self.name(),
                    ctx.timestamp_ns,
                    ctx.current_exposures.clone(),
                ));
            }
        };

        Ok(StrategyOutput::rebalance(
            self.name(),
            ctx.timestamp_ns,
            weights,
        ))
    }

    fn name(&self) -> &str {
        "regime_follow"
    }

    fn reset(&mut self) {
        self.last_regime = None;
    }
}
