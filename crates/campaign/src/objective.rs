//! Guarded objective construction.
//!
//! Wraps one simulation run as a search objective. Any failure (override
//! mismatch, contract violation, execution error, exceeded evaluation
//! budget) converts to the sentinel-scored record at this boundary, so a
//! multi-thousand-run campaign never crashes on one bad candidate.

use meridian_backtest::run_simulation;
use meridian_data::MarketStore;
use meridian_metrics::{compute_fitness, ScoreWeights};
use meridian_types::{FitnessRecord, ParameterSet, SimulationConfig};

use crate::overrides::apply_overrides;

/// Builds the objective closure for one campaign.
///
/// The returned closure is pure and `Sync`: it clones the base config,
/// applies the candidate's overrides, runs the simulation against the
/// shared read-only store, and scores the outcome.
pub fn build_objective<'a>(
    base: &'a SimulationConfig,
    data: &'a MarketStore,
    weights: ScoreWeights,
) -> impl Fn(&ParameterSet) -> FitnessRecord + Sync + 'a {
    move |params: &ParameterSet| {
        let config = match apply_overrides(base, params) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    fingerprint = %params.fingerprint(),
                    error = %err,
                    "candidate infeasible: override failed"
                );
                return FitnessRecord::infeasible(params.clone());
            }
        };

        match run_simulation(config, data) {
            Ok(result) => {
                let equity_curve = result.equity_curve.unwrap_or_default();
                let orders = result.orders.unwrap_or_default();
                compute_fitness(params.clone(), &equity_curve, &orders, &weights)
            }
            Err(err) => {
                tracing::warn!(
                    fingerprint = %params.fingerprint(),
                    error = %err,
                    "candidate infeasible: simulation failed"
                );
                FitnessRecord::infeasible(params.clone())
            }
        }
    }
}
