//! Scalar fitness of one evaluated parameter set.

use crate::param::ParameterSet;

/// Sentinel composite score for infeasible evaluations.
///
/// Large and negative so every search method ranks (and evolves) away from
/// broken candidates instead of crashing the campaign.
pub const INFEASIBLE_SCORE: f64 = -1.0e6;

/// Performance summary of one completed (or failed) evaluation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FitnessRecord {
    /// The evaluated parameter set
    pub parameter_set: ParameterSet,
    /// Compound annual growth rate
    pub cagr: f64,
    /// Annualized Sharpe ratio
    pub sharpe: f64,
    /// Maximum drawdown, `nav / peak - 1` convention (<= 0)
    pub max_drawdown: f64,
    /// Fraction of realizing trades that closed profitably
    pub win_rate: f64,
    /// Weighted composite score (the search objective)
    pub composite_score: f64,
    /// False when the evaluation failed and the score is the sentinel
    pub feasible: bool,
}

impl FitnessRecord {
    /// Builds the sentinel record for an infeasible evaluation.
    #[must_use]
    pub fn infeasible(parameter_set: ParameterSet) -> Self {
        Self {
            parameter_set,
            cagr: 0.0,
            sharpe: 0.0,
            max_drawdown: 0.0,
            win_rate: 0.0,
            composite_score: INFEASIBLE_SCORE,
            feasible: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_infeasible_record_carries_sentinel() {
        let record = FitnessRecord::infeasible(ParameterSet::from_pairs(&[("x", 1.0)]));
        assert!(!record.feasible);
        assert_relative_eq!(record.composite_score, INFEASIBLE_SCORE, epsilon = 1e-6);
    }
}
