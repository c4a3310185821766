//! Dot-path parameter overrides onto a simulation config.
//!
//! Search operates on flat `name -> f64` parameter sets; this module maps
//! them onto the nested config. Engine-level fields use fixed paths
//! (`risk.gross_leverage_cap`); strategy parameters route through
//! `strategy.<slot_id>.<param>`. Unknown paths are an error; a typo that
//! silently no-ops would turn a whole campaign into noise.

use meridian_types::SimulationConfig;

use crate::error::CampaignError;

/// Applies every parameter in the set to a cloned config.
///
/// # Errors
/// Returns [`CampaignError::UnknownParameter`] on the first path that names
/// no config field.
pub fn apply_overrides(
    base: &SimulationConfig,
    params: &meridian_types::ParameterSet,
) -> Result<SimulationConfig, CampaignError> {
    let mut config = base.clone();
    for (path, value) in &params.values {
        apply_one(&mut config, path, *value)?;
    }
    Ok(config)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn apply_one(config: &mut SimulationConfig, path: &str, value: f64) -> Result<(), CampaignError> {
    match path {
        // === Engine ===
        "leverage_multiplier" => config.leverage_multiplier = value,
        "min_trade_fraction" => config.min_trade_fraction = value,
        "initial_nav" => config.initial_nav = value,
        "warmup_bars" => config.warmup_bars = value.max(0.0) as usize,

        // === Risk gate ===
        "risk.per_asset_cap" => config.risk.per_asset_cap = value,
        "risk.gross_leverage_cap" => config.risk.gross_leverage_cap = value,
        "risk.drawdown.threshold" => config.risk.drawdown.threshold = value,
        "risk.drawdown.reset_threshold" => config.risk.drawdown.reset_threshold = value,
        "risk.drawdown.derisk_factor" => config.risk.drawdown.derisk_factor = value,

        // === Costs ===
        "costs.commission_bps" => config.costs.commission_bps = value,
        "costs.commission_min" => config.costs.commission_min = value,
        "costs.slippage_bps" => config.costs.slippage_bps = value,
        "costs.slippage_jitter_bps" => config.costs.slippage_jitter_bps = value,

        // === Context provider ===
        "context.feature_lookback_bars" => {
            config.context.feature_lookback_bars = value.max(0.0) as usize;
        }
        "context.regime_lookback_bars" => {
            config.context.regime_lookback_bars = value.max(0.0) as usize;
        }
        "context.regime_threshold" => config.context.regime_threshold = value,

        // === Strategy slots: strategy.<slot_id>.<param> ===
        _ => {
            let Some(rest) = path.strip_prefix("strategy.") else {
                return Err(CampaignError::UnknownParameter(path.to_string()));
            };
            let Some((slot_id, param)) = rest.split_once('.') else {
                return Err(CampaignError::UnknownParameter(path.to_string()));
            };

            let slot = config
                .strategies
                .iter_mut()
                .find(|slot| slot.id() == slot_id)
                .ok_or_else(|| CampaignError::UnknownParameter(path.to_string()))?;

            if param == "budget_fraction" {
                slot.budget_fraction = value;
                return Ok(());
            }

            if !slot.parameters.is_object() {
                slot.parameters = serde_json::json!({});
            }
            let map = slot
                .parameters
                .as_object_mut()
                .ok_or_else(|| CampaignError::UnknownParameter(path.to_string()))?;
            map.insert(param.to_string(), number_value(value));
        }
    }
    Ok(())
}

/// Integral values serialize as integers so integer-typed strategy
/// parameters (lookbacks, counts) deserialize cleanly.
#[allow(clippy::cast_possible_truncation)]
fn number_value(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        serde_json::json!(value as i64)
    } else {
        serde_json::json!(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meridian_types::ParameterSet;

    fn base_config() -> SimulationConfig {
        serde_json::from_value(serde_json::json!({
            "schema_version": "1",
            "start_date": "2022-01-01",
            "end_date": "2022-06-30",
            "universe": ["BTC"],
            "run_mode": "dev",
            "strategies": [
                {"name": "momentum", "budget_fraction": 1.0,
                 "parameters": {"top_n": 1, "rebalance_bars": 5}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_engine_level_override() {
        let params = ParameterSet::from_pairs(&[
            ("leverage_multiplier", 1.5),
            ("risk.gross_leverage_cap", 1.8),
        ]);
        let config = apply_overrides(&base_config(), &params).unwrap();

        assert_relative_eq!(config.leverage_multiplier, 1.5, epsilon = 1e-12);
        assert_relative_eq!(config.risk.gross_leverage_cap, 1.8, epsilon = 1e-12);
    }

    #[test]
    fn test_strategy_param_override_keeps_integer_typing() {
        let params = ParameterSet::from_pairs(&[("strategy.momentum.rebalance_bars", 10.0)]);
        let config = apply_overrides(&base_config(), &params).unwrap();

        let value = &config.strategies[0].parameters["rebalance_bars"];
        assert!(value.is_i64());
        assert_eq!(value.as_i64(), Some(10));
        // Untouched sibling parameters survive
        assert_eq!(config.strategies[0].parameters["top_n"].as_i64(), Some(1));
    }

    #[test]
    fn test_strategy_budget_override() {
        let params = ParameterSet::from_pairs(&[("strategy.momentum.budget_fraction", 0.5)]);
        let config = apply_overrides(&base_config(), &params).unwrap();
        assert_relative_eq!(config.strategies[0].budget_fraction, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_path_rejected() {
        let params = ParameterSet::from_pairs(&[("risk.bogus", 1.0)]);
        let result = apply_overrides(&base_config(), &params);
        assert!(matches!(result, Err(CampaignError::UnknownParameter(_))));
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let params = ParameterSet::from_pairs(&[("strategy.ghost.lookback", 1.0)]);
        let result = apply_overrides(&base_config(), &params);
        assert!(matches!(result, Err(CampaignError::UnknownParameter(_))));
    }

    #[test]
    fn test_base_config_untouched() {
        let base = base_config();
        let params = ParameterSet::from_pairs(&[("leverage_multiplier", 2.0)]);
        let _ = apply_overrides(&base, &params).unwrap();
        assert_relative_eq!(base.leverage_multiplier, 1.0, epsilon = 1e-12);
    }
}
