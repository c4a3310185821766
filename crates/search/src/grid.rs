//! Exhaustive grid search.
//!
//! Cartesian product of every parameter's grid points, evaluated in
//! parallel. Cardinality grows multiplicatively; intended for spaces of at
//! most four parameters or so. The cardinality is logged up front so a
//! runaway grid is visible before it burns a day.

use meridian_types::{FitnessRecord, ParameterSet};

use crate::cancel::CancellationToken;
use crate::engine::{evaluate_batch, Objective};
use crate::space::ParamSpace;

/// Runs the exhaustive grid.
pub(crate) fn search(
    space: &ParamSpace,
    objective: &Objective<'_>,
    token: &CancellationToken,
) -> Vec<FitnessRecord> {
    let combinations = generate_combinations(space);
    tracing::info!("grid search: {} combinations", combinations.len());

    evaluate_batch(combinations, objective, token)
}

/// All grid combinations, in deterministic declaration order.
pub(crate) fn generate_combinations(space: &ParamSpace) -> Vec<ParameterSet> {
    let mut result = vec![ParameterSet::default()];

    for spec in &space.params {
        let values = spec.grid_values();
        let mut expanded = Vec::with_capacity(result.len() * values.len());
        for partial in &result {
            for value in &values {
                let mut candidate = partial.clone();
                candidate.values.insert(spec.name.clone(), *value);
                expanded.push(candidate);
            }
        }
        result = expanded;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::{ParamBounds, ParamSpec};

    fn space() -> ParamSpace {
        ParamSpace {
            params: vec![
                ParamSpec {
                    name: "a".to_string(),
                    bounds: ParamBounds::IntRange { lo: 1, hi: 2, step: 1 },
                    grid_steps: 5,
                },
                ParamSpec {
                    name: "b".to_string(),
                    bounds: ParamBounds::Discrete {
                        values: vec![0.1, 0.2, 0.3],
                    },
                    grid_steps: 5,
                },
            ],
        }
    }

    #[test]
    fn test_cartesian_product_size() {
        let combos = generate_combinations(&space());
        assert_eq!(combos.len(), 6);
    }

    #[test]
    fn test_every_combination_unique() {
        let combos = generate_combinations(&space());
        let mut fingerprints: Vec<String> = combos.iter().map(ParameterSet::fingerprint).collect();
        fingerprints.sort();
        fingerprints.dedup();
        assert_eq!(fingerprints.len(), 6);
    }

    #[test]
    fn test_grid_search_evaluates_all() {
        let objective = |params: &ParameterSet| {
            let mut record = FitnessRecord::infeasible(params.clone());
            record.feasible = true;
            record.composite_score = params.get("a").unwrap_or(0.0) + params.get("b").unwrap_or(0.0);
            record
        };

        let records = search(&space(), &objective, &CancellationToken::new());
        assert_eq!(records.len(), 6);
    }

    #[test]
    fn test_cancelled_grid_returns_partial() {
        let token = CancellationToken::new();
        token.cancel();

        let objective = |params: &ParameterSet| FitnessRecord::infeasible(params.clone());
        let records = search(&space(), &objective, &token);
        assert!(records.is_empty());
    }
}
