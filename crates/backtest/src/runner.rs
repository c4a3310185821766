//! High-level simulation runner helpers.

use meridian_data::MarketStore;
use meridian_types::{SimulationConfig, SimulationResult};

use crate::date::{parse_datetime_ns, DateBoundary};
use crate::engine::SimulationEngine;
use crate::error::SimulationError;

/// Runs one simulation over a pre-loaded market store.
///
/// # Errors
/// - [`SimulationError::ConfigValidation`] for invalid configuration values.
/// - Any error from engine initialization or execution, including contract
///   violations, which are fatal for the run.
pub fn run_simulation(
    config: SimulationConfig,
    data: &MarketStore,
) -> Result<SimulationResult, SimulationError> {
    validate_config(&config)?;
    let engine = SimulationEngine::new(config, data)?;
    engine.run()
}

/// Like [`run_simulation`] but absorbs the error into the result payload,
/// for callers that want a serializable outcome either way.
#[must_use]
pub fn run_simulation_to_result(config: SimulationConfig, data: &MarketStore) -> SimulationResult {
    match run_simulation(config, data) {
        Ok(result) => result,
        Err(err) => SimulationResult {
            ok: false,
            error: Some(err.into()),
            orders: None,
            equity_curve: None,
            meta: None,
        },
    }
}

/// Validates a simulation config before the engine is built.
///
/// # Errors
/// Returns [`SimulationError::ConfigValidation`] naming the first invalid
/// field.
pub fn validate_config(config: &SimulationConfig) -> Result<(), SimulationError> {
    if config.universe.is_empty() {
        return Err(SimulationError::ConfigValidation(
            "universe is empty".to_string(),
        ));
    }
    if config.strategies.is_empty() {
        return Err(SimulationError::ConfigValidation(
            "no strategy slots configured".to_string(),
        ));
    }

    let mut seen_ids = std::collections::BTreeSet::new();
    let mut budget_sum = 0.0;
    for slot in &config.strategies {
        if !seen_ids.insert(slot.id()) {
            return Err(SimulationError::ConfigValidation(format!(
                "duplicate strategy id '{}'",
                slot.id()
            )));
        }
        if !(0.0..=1.0).contains(&slot.budget_fraction) {
            return Err(SimulationError::ConfigValidation(format!(
                "strategy '{}': budget_fraction must be within [0, 1]",
                slot.id()
            )));
        }
        budget_sum += slot.budget_fraction;
    }
    if budget_sum > 1.0 + 1e-9 {
        return Err(SimulationError::ConfigValidation(format!(
            "budget fractions sum to {budget_sum}, must be <= 1"
        )));
    }

    if config.initial_nav <= 0.0 {
        return Err(SimulationError::ConfigValidation(
            "initial_nav must be > 0".to_string(),
        ));
    }
    if config.leverage_multiplier <= 0.0 {
        return Err(SimulationError::ConfigValidation(
            "leverage_multiplier must be > 0".to_string(),
        ));
    }
    if config.warmup_bars == 0 {
        return Err(SimulationError::ConfigValidation(
            "warmup_bars must be > 0".to_string(),
        ));
    }
    if config.min_trade_fraction < 0.0 {
        return Err(SimulationError::ConfigValidation(
            "min_trade_fraction must be >= 0".to_string(),
        ));
    }

    if config.risk.per_asset_cap <= 0.0 {
        return Err(SimulationError::ConfigValidation(
            "risk.per_asset_cap must be > 0".to_string(),
        ));
    }
    if config.risk.gross_leverage_cap <= 0.0 {
        return Err(SimulationError::ConfigValidation(
            "risk.gross_leverage_cap must be > 0".to_string(),
        ));
    }
    let dd = &config.risk.drawdown;
    if dd.enabled {
        if dd.threshold <= 0.0 || dd.threshold >= 1.0 {
            return Err(SimulationError::ConfigValidation(
                "risk.drawdown.threshold must be within (0, 1)".to_string(),
            ));
        }
        if dd.reset_threshold >= dd.threshold {
            return Err(SimulationError::ConfigValidation(
                "risk.drawdown.reset_threshold must be below threshold".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&dd.derisk_factor) {
            return Err(SimulationError::ConfigValidation(
                "risk.drawdown.derisk_factor must be within [0, 1]".to_string(),
            ));
        }
    }

    if config.costs.commission_bps < 0.0
        || config.costs.slippage_bps < 0.0
        || config.costs.slippage_jitter_bps < 0.0
    {
        return Err(SimulationError::ConfigValidation(
            "costs must be >= 0".to_string(),
        ));
    }

    let start_ns = parse_datetime_ns(&config.start_date, DateBoundary::Start)
        .map_err(|e| SimulationError::ConfigValidation(e.to_string()))?;
    let end_ns = parse_datetime_ns(&config.end_date, DateBoundary::End)
        .map_err(|e| SimulationError::ConfigValidation(e.to_string()))?;
    if start_ns >= end_ns {
        return Err(SimulationError::ConfigValidation(
            "start_date must be before end_date".to_string(),
        ));
    }

    if let Some(budget) = config.max_eval_seconds {
        if budget <= 0.0 {
            return Err(SimulationError::ConfigValidation(
                "max_eval_seconds must be > 0".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_types::StrategySlotConfig;

    fn base_config() -> SimulationConfig {
        serde_json::from_value(serde_json::json!({
            "schema_version": "1",
            "start_date": "2022-01-01",
            "end_date": "2022-06-30",
            "universe": ["BTC", "ETH"],
            "run_mode": "dev",
            "strategies": [
                {"name": "buy_and_hold", "budget_fraction": 0.6},
                {"name": "momentum", "budget_fraction": 0.4}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_budget_sum_above_one_rejected() {
        let mut config = base_config();
        config.strategies = vec![
            StrategySlotConfig {
                name: "buy_and_hold".to_string(),
                strategy_id: None,
                budget_fraction: 0.7,
                parameters: serde_json::json!({}),
            },
            StrategySlotConfig {
                name: "momentum".to_string(),
                strategy_id: None,
                budget_fraction: 0.5,
                parameters: serde_json::json!({}),
            },
        ];

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, SimulationError::ConfigValidation(_)));
    }

    #[test]
    fn test_empty_universe_rejected() {
        let mut config = base_config();
        config.universe.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_inverted_dates_rejected() {
        let mut config = base_config();
        config.start_date = "2022-06-30".to_string();
        config.end_date = "2022-01-01".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_hysteresis_gap_required() {
        let mut config = base_config();
        config.risk.drawdown.reset_threshold = config.risk.drawdown.threshold;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("reset_threshold"));
    }

    #[test]
    fn test_zero_leverage_rejected() {
        let mut config = base_config();
        config.leverage_multiplier = 0.0;
        assert!(validate_config(&config).is_err());
    }
}
