//! Random search.
//!
//! `n` independent draws from the declared bounds: uniform, log-uniform,
//! integer, or discrete per parameter. Draws are generated sequentially
//! from the seeded RNG (so the candidate list is reproducible) and
//! evaluated in parallel.

use meridian_types::{FitnessRecord, ParameterSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cancel::CancellationToken;
use crate::engine::{evaluate_batch, Objective};
use crate::space::ParamSpace;

/// Runs random search with `samples` draws.
pub(crate) fn search(
    space: &ParamSpace,
    objective: &Objective<'_>,
    samples: usize,
    seed: u64,
    token: &CancellationToken,
) -> Vec<FitnessRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let candidates: Vec<ParameterSet> = (0..samples)
        .map(|_| draw(space, &mut rng))
        .collect();
    tracing::info!("random search: {} draws", candidates.len());

    evaluate_batch(candidates, objective, token)
}

/// One draw across all parameters.
pub(crate) fn draw(space: &ParamSpace, rng: &mut ChaCha8Rng) -> ParameterSet {
    let mut candidate = ParameterSet::default();
    for spec in &space.params {
        candidate.values.insert(spec.name.clone(), spec.sample(rng));
    }
    candidate
}
