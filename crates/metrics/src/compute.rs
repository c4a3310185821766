//! Fitness computation entrypoints.

use meridian_types::{EquityPoint, FitnessRecord, Order, ParameterSet};

use crate::equity_metrics::{compute_cagr, compute_max_drawdown, compute_sharpe};
use crate::score::ScoreWeights;
use crate::trade_metrics::compute_win_rate;

/// Reduces one completed run into a [`FitnessRecord`].
///
/// Infeasible runs never reach this function: the campaign layer assigns
/// [`meridian_types::fitness::INFEASIBLE_SCORE`] before scoring happens.
#[must_use]
pub fn compute_fitness(
    parameter_set: ParameterSet,
    equity_curve: &[EquityPoint],
    orders: &[Order],
    weights: &ScoreWeights,
) -> FitnessRecord {
    let cagr = compute_cagr(equity_curve);
    let sharpe = compute_sharpe(equity_curve);
    let max_drawdown = compute_max_drawdown(equity_curve);
    let win_rate = compute_win_rate(orders);
    let composite_score = weights.composite(sharpe, cagr, win_rate, max_drawdown);

    FitnessRecord {
        parameter_set,
        cagr,
        sharpe,
        max_drawdown,
        win_rate,
        composite_score,
        feasible: true,
    }
}
