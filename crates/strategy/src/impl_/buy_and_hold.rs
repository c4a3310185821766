//! Buy-and-hold baseline: invest equal weight on the first bar, then hold.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::StrategyError;
use crate::traits::Strategy;
use meridian_types::StrategyOutput;

/// Buy-and-hold parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyAndHoldParams {
    /// Optional explicit weights; equal weight across the universe when empty
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

/// Buy-and-hold strategy.
pub struct BuyAndHold {
    params: BuyAndHoldParams,
    entered: bool,
}

impl BuyAndHold {
    /// Creates the strategy from JSON parameters.
    ///
    /// # Errors
    /// Returns [`StrategyError::InvalidParams`] on malformed parameters or
    /// explicit weights that break the model-relative contract.
    pub fn from_params(params: &serde_json::Value) -> Result<Self, StrategyError> {
        let params: BuyAndHoldParams = serde_json::from_value(params.clone())
            .map_err(|e| StrategyError::InvalidParams(e.to_string()))?;

        let sum: f64 = params.weights.values().sum();
        if params.weights.values().any(|w| *w < 0.0) || sum > 1.0 + 1e-9 {
            return Err(StrategyError::InvalidParams(
                "explicit weights must be non-negative and sum to <= 1".to_string(),
            ));
        }

        Ok(Self {
            params,
            entered: false,
        })
    }
}

impl Strategy for BuyAndHold {
    fn evaluate(&mut self, ctx: &Context) -> Result<StrategyOutput, StrategyError> {
        if self.entered {
            return Ok(StrategyOutput::hold(
                self.name(),
                ctx.timestamp_ns,
                ctx.current_exposures.clone(),
            ));
        }

        self.entered = true;
        let weights = if self.params.weights.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let weight = 1.0 / ctx.features.len().max(1) as f64;
            ctx.features
                .keys()
                .map(|symbol| (symbol.clone(), weight))
                .collect()
        } else {
            self.params.weights.clone()
        };

        Ok(StrategyOutput::rebalance(
            self.name(),
            ctx.timestamp_ns,
            weights,
        ))
    }

    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn reset(&mut self) {
        self.entered = false;
    }
}
