//! Per-bar strategy intent.

use std::collections::BTreeMap;

use crate::error::CoreError;

/// Tolerance for the weight-sum contract check.
const WEIGHT_SUM_EPS: f64 = 1e-9;

/// Intent vector emitted by one strategy for one bar.
///
/// The meaning of `weights` depends on `hold_current`:
/// - `hold_current = false`: weights are model-relative, meaning
///   non-negative, summing to at most 1.0, and expressing fractions of the
///   strategy's own budget. Budget fraction and leverage are applied
///   downstream, exactly once.
/// - `hold_current = true`: weights are the unmodified NAV-relative
///   exposures to retain. No multiplier may ever be re-applied to them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StrategyOutput {
    /// Identifier of the emitting strategy slot
    pub strategy_id: String,
    /// Decision bar timestamp in nanoseconds
    pub timestamp_ns: i64,
    /// Per-symbol weights (interpretation per `hold_current`)
    pub weights: BTreeMap<String, f64>,
    /// Keep current exposure untouched this bar
    pub hold_current: bool,
    /// Free-form hints for downstream consumers
    #[serde(default)]
    pub hints: serde_json::Value,
}

impl StrategyOutput {
    /// Creates an active (rebalancing) output.
    #[must_use]
    pub fn rebalance(
        strategy_id: impl Into<String>,
        timestamp_ns: i64,
        weights: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            timestamp_ns,
            weights,
            hold_current: false,
            hints: serde_json::Value::Null,
        }
    }

    /// Creates a holding output carrying the current exposures verbatim.
    #[must_use]
    pub fn hold(
        strategy_id: impl Into<String>,
        timestamp_ns: i64,
        current_exposures: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            timestamp_ns,
            weights: current_exposures,
            hold_current: true,
            hints: serde_json::Value::Null,
        }
    }

    /// Validates the weight contract for active outputs.
    ///
    /// Holding outputs are exempt: they carry NAV-relative exposures which
    /// may legitimately exceed 1.0 under leverage.
    ///
    /// # Errors
    /// Returns [`CoreError::Contract`] on a negative, non-finite, or
    /// over-unity weight vector. Violations are fatal for the enclosing
    /// simulation run; clamping here would silently corrupt reported
    /// performance.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.hold_current {
            for (symbol, weight) in &self.weights {
                if !weight.is_finite() {
                    return Err(CoreError::Contract(format!(
                        "strategy '{}': non-finite held exposure for {symbol}",
                        self.strategy_id
                    )));
                }
            }
            return Ok(());
        }

        let mut sum = 0.0;
        for (symbol, weight) in &self.weights {
            if !weight.is_finite() {
                return Err(CoreError::Contract(format!(
                    "strategy '{}': non-finite weight for {symbol}",
                    self.strategy_id
                )));
            }
            if *weight < 0.0 {
                return Err(CoreError::Contract(format!(
                    "strategy '{}': negative weight {weight} for {symbol}",
                    self.strategy_id
                )));
            }
            sum += weight;
        }

        if sum > 1.0 + WEIGHT_SUM_EPS {
            return Err(CoreError::Contract(format!(
                "strategy '{}': weight sum {sum} exceeds 1.0",
                self.strategy_id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(sym, w)| ((*sym).to_string(), *w))
            .collect()
    }

    #[test]
    fn test_valid_rebalance_output() {
        let output = StrategyOutput::rebalance("momentum", 0, weights(&[("BTC", 0.6), ("ETH", 0.4)]));
        assert!(output.validate().is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let output = StrategyOutput::rebalance("momentum", 0, weights(&[("BTC", -0.1)]));
        let err = output.validate().unwrap_err();
        assert!(matches!(err, CoreError::Contract(_)));
    }

    #[test]
    fn test_weight_sum_above_one_rejected() {
        let output = StrategyOutput::rebalance("momentum", 0, weights(&[("BTC", 0.7), ("ETH", 0.5)]));
        assert!(output.validate().is_err());
    }

    #[test]
    fn test_hold_output_may_exceed_unity() {
        // A leveraged book carried forward is a legal held exposure.
        let output = StrategyOutput::hold("momentum", 0, weights(&[("BTC", 1.25)]));
        assert!(output.validate().is_ok());
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let output = StrategyOutput::rebalance("momentum", 0, weights(&[("BTC", f64::NAN)]));
        assert!(output.validate().is_err());

        let held = StrategyOutput::hold("momentum", 0, weights(&[("BTC", f64::INFINITY)]));
        assert!(held.validate().is_err());
    }

    #[test]
    fn test_output_serde_roundtrip() {
        let output = StrategyOutput::rebalance("regime", 42, weights(&[("SPY", 1.0)]));
        let json = serde_json::to_string(&output).unwrap();
        let deserialized: StrategyOutput = serde_json::from_str(&json).unwrap();

        assert_eq!(output.strategy_id, deserialized.strategy_id);
        assert_eq!(output.hold_current, deserialized.hold_current);
        assert_eq!(output.weights, deserialized.weights);
    }
}
