//! Search entry point and shared evaluation plumbing.

use meridian_types::{FitnessRecord, ParameterSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::SearchError;
use crate::space::ParamSpace;
use crate::{evolutionary, grid, random};

/// The search objective: evaluate one parameter set to a fitness record.
///
/// Implementations must be pure and deterministic; the engine relies on
/// that for reproducibility and for safe parallel evaluation. Infeasible
/// candidates are expected to come back with the sentinel score, not as
/// panics.
pub type Objective<'a> = dyn Fn(&ParameterSet) -> FitnessRecord + Sync + 'a;

/// Search method selection with its hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SearchMethod {
    /// Exhaustive Cartesian product of the grid points (<= 4 parameters
    /// recommended)
    Grid,
    /// Random sampling of the bounds
    Random {
        /// Number of draws
        samples: usize,
    },
    /// Evolutionary search
    Evolutionary(EvolutionConfig),
}

/// Hyperparameters of the evolutionary method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Population size
    #[serde(default = "default_population")]
    pub population: usize,
    /// Number of generations
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Per-parameter crossover rate
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    /// Per-parameter mutation rate
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Mutation noise as a fraction of each parameter's span
    #[serde(default = "default_mutation_sigma")]
    pub mutation_sigma: f64,
    /// Tournament size for parent selection
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Individuals carried unchanged into the next generation
    #[serde(default = "default_elites")]
    pub elites: usize,
}

fn default_population() -> usize {
    24
}
fn default_generations() -> usize {
    10
}
fn default_crossover_rate() -> f64 {
    0.6
}
fn default_mutation_rate() -> f64 {
    0.2
}
fn default_mutation_sigma() -> f64 {
    0.1
}
fn default_tournament_size() -> usize {
    3
}
fn default_elites() -> usize {
    2
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population: default_population(),
            generations: default_generations(),
            crossover_rate: default_crossover_rate(),
            mutation_rate: default_mutation_rate(),
            mutation_sigma: default_mutation_sigma(),
            tournament_size: default_tournament_size(),
            elites: default_elites(),
        }
    }
}

impl EvolutionConfig {
    fn validate(&self) -> Result<(), SearchError> {
        if self.population < 2 {
            return Err(SearchError::InvalidMethod(
                "population must be >= 2".to_string(),
            ));
        }
        if self.generations == 0 {
            return Err(SearchError::InvalidMethod(
                "generations must be >= 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) || !(0.0..=1.0).contains(&self.mutation_rate)
        {
            return Err(SearchError::InvalidMethod(
                "crossover_rate and mutation_rate must be within [0, 1]".to_string(),
            ));
        }
        if self.mutation_sigma < 0.0 {
            return Err(SearchError::InvalidMethod(
                "mutation_sigma must be >= 0".to_string(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(SearchError::InvalidMethod(
                "tournament_size must be >= 1".to_string(),
            ));
        }
        if self.elites >= self.population {
            return Err(SearchError::InvalidMethod(
                "elites must be below population".to_string(),
            ));
        }
        Ok(())
    }
}

/// Runs one search campaign over the space.
///
/// Candidates are evaluated on the rayon worker pool, one self-contained
/// simulation per worker over shared read-only data. Results come back
/// sorted best-first by composite score, with the parameter fingerprint as
/// a deterministic tiebreak.
///
/// # Errors
/// Returns [`SearchError`] for a malformed space or method configuration;
/// individual candidate failures surface as sentinel-scored records, never
/// as errors.
pub fn run_search(
    space: &ParamSpace,
    objective: &Objective<'_>,
    method: &SearchMethod,
    seed: u64,
    token: &CancellationToken,
) -> Result<Vec<FitnessRecord>, SearchError> {
    space.validate()?;

    let mut records = match method {
        SearchMethod::Grid => grid::search(space, objective, token),
        SearchMethod::Random { samples } => {
            if *samples == 0 {
                return Err(SearchError::InvalidMethod(
                    "samples must be >= 1".to_string(),
                ));
            }
            random::search(space, objective, *samples, seed, token)
        }
        SearchMethod::Evolutionary(config) => {
            config.validate()?;
            evolutionary::search(space, objective, config, seed, token)
        }
    };

    sort_records(&mut records);
    Ok(records)
}

/// Evaluates a batch of candidates in parallel, checking the cancellation
/// token before each evaluation. Skipped candidates simply drop out;
/// completed results stay valid.
pub(crate) fn evaluate_batch(
    candidates: Vec<ParameterSet>,
    objective: &Objective<'_>,
    token: &CancellationToken,
) -> Vec<FitnessRecord> {
    candidates
        .into_par_iter()
        .filter_map(|candidate| {
            if token.is_cancelled() {
                return None;
            }
            Some(objective(&candidate))
        })
        .collect()
}

/// Best-first ordering: composite score descending, fingerprint as the
/// deterministic tiebreak.
pub(crate) fn sort_records(records: &mut [FitnessRecord]) {
    records.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.parameter_set.fingerprint().cmp(&b.parameter_set.fingerprint()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evolution_config_defaults_valid() {
        assert!(EvolutionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_evolution_config_rejects_elites_at_population() {
        let config = EvolutionConfig {
            population: 4,
            elites: 4,
            ..EvolutionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_method_serde() {
        let method: SearchMethod =
            serde_json::from_value(serde_json::json!({"method": "random", "samples": 50})).unwrap();
        assert!(matches!(method, SearchMethod::Random { samples: 50 }));

        let method: SearchMethod = serde_json::from_value(serde_json::json!({
            "method": "evolutionary", "population": 16, "generations": 5
        }))
        .unwrap();
        match method {
            SearchMethod::Evolutionary(config) => {
                assert_eq!(config.population, 16);
                assert_eq!(config.generations, 5);
                // Unspecified hyperparameters fall back to defaults
                assert_eq!(config.elites, 2);
            }
            other => panic!("unexpected method {other:?}"),
        }
    }

    #[test]
    fn test_sort_records_is_best_first() {
        let record = |name: &str, score: f64| {
            let mut r = FitnessRecord::infeasible(ParameterSet::from_pairs(&[(name, 1.0)]));
            r.composite_score = score;
            r.feasible = true;
            r
        };
        let mut records = vec![record("a", 0.1), record("b", 0.9), record("c", 0.5)];
        sort_records(&mut records);

        assert!((records[0].composite_score - 0.9).abs() < 1e-12);
        assert!((records[2].composite_score - 0.1).abs() < 1e-12);
    }
}
