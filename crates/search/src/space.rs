//! Parameter space definition.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Default subdivisions when a continuous bound is discretized for grid
/// search.
const DEFAULT_GRID_STEPS: usize = 5;

/// Legal range for one parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamBounds {
    /// Explicit discrete values
    Discrete {
        /// Allowed values
        values: Vec<f64>,
    },
    /// Integer range, inclusive, with step
    IntRange {
        /// Lower bound
        lo: i64,
        /// Upper bound
        hi: i64,
        /// Step between values
        #[serde(default = "default_int_step")]
        step: i64,
    },
    /// Continuous uniform range
    Uniform {
        /// Lower bound
        lo: f64,
        /// Upper bound
        hi: f64,
    },
    /// Continuous log-uniform range (both bounds > 0)
    LogUniform {
        /// Lower bound
        lo: f64,
        /// Upper bound
        hi: f64,
    },
}

fn default_int_step() -> i64 {
    1
}

/// One named parameter with its bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (a dot-path into the simulation config)
    pub name: String,
    /// Value bounds
    pub bounds: ParamBounds,
    /// Grid subdivisions for continuous bounds
    #[serde(default = "default_grid_steps")]
    pub grid_steps: usize,
}

fn default_grid_steps() -> usize {
    DEFAULT_GRID_STEPS
}

impl ParamSpec {
    /// Grid points for this parameter.
    #[must_use]
    pub fn grid_values(&self) -> Vec<f64> {
        match &self.bounds {
            ParamBounds::Discrete { values } => values.clone(),
            ParamBounds::IntRange { lo, hi, step } => {
                let step = (*step).max(1);
                #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
                let values: Vec<f64> = (*lo..=*hi)
                    .step_by(step as usize)
                    .map(|v| v as f64)
                    .collect();
                values
            }
            ParamBounds::Uniform { lo, hi } => linspace(*lo, *hi, self.grid_steps.max(2)),
            ParamBounds::LogUniform { lo, hi } => linspace(lo.ln(), hi.ln(), self.grid_steps.max(2))
                .into_iter()
                .map(f64::exp)
                .collect(),
        }
    }

    /// Draws one value from the bounds.
    pub fn sample(&self, rng: &mut ChaCha8Rng) -> f64 {
        match &self.bounds {
            ParamBounds::Discrete { values } => {
                let idx = rng.gen_range(0..values.len());
                values[idx]
            }
            ParamBounds::IntRange { lo, hi, step } => {
                let step = (*step).max(1);
                let slots = (hi - lo) / step;
                let pick = rng.gen_range(0..=slots);
                #[allow(clippy::cast_precision_loss)]
                let value = (lo + pick * step) as f64;
                value
            }
            ParamBounds::Uniform { lo, hi } => rng.gen_range(*lo..=*hi),
            ParamBounds::LogUniform { lo, hi } => {
                let exponent = rng.gen_range(lo.ln()..=hi.ln());
                exponent.exp()
            }
        }
    }

    /// Clamps a mutated value back into the bounds, snapping discrete and
    /// integer bounds to their nearest legal value.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        match &self.bounds {
            ParamBounds::Discrete { values } => values
                .iter()
                .copied()
                .min_by(|a, b| {
                    (a - value)
                        .abs()
                        .partial_cmp(&(b - value).abs())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(value),
            ParamBounds::IntRange { lo, hi, step } => {
                let step = (*step).max(1);
                #[allow(clippy::cast_precision_loss)]
                let (lo_f, hi_f) = (*lo as f64, *hi as f64);
                let clamped = value.clamp(lo_f, hi_f);
                #[allow(clippy::cast_precision_loss)]
                let step_f = step as f64;
                let snapped = lo_f + ((clamped - lo_f) / step_f).round() * step_f;
                snapped.clamp(lo_f, hi_f)
            }
            ParamBounds::Uniform { lo, hi } => value.clamp(*lo, *hi),
            ParamBounds::LogUniform { lo, hi } => value.clamp(*lo, *hi),
        }
    }

    /// Width of the bounds, used to scale mutation noise.
    #[must_use]
    pub fn span(&self) -> f64 {
        match &self.bounds {
            ParamBounds::Discrete { values } => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (max - min).max(0.0)
            }
            #[allow(clippy::cast_precision_loss)]
            ParamBounds::IntRange { lo, hi, .. } => (hi - lo) as f64,
            ParamBounds::Uniform { lo, hi } | ParamBounds::LogUniform { lo, hi } => hi - lo,
        }
    }
}

/// The full declared parameter space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpace {
    /// Parameters in declaration order
    pub params: Vec<ParamSpec>,
}

impl ParamSpace {
    /// Validates the space before a search may run.
    ///
    /// # Errors
    /// Returns [`SearchError::InvalidSpace`] naming the first offending
    /// parameter.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.params.is_empty() {
            return Err(SearchError::InvalidSpace("no parameters".to_string()));
        }

        for spec in &self.params {
            match &spec.bounds {
                ParamBounds::Discrete { values } => {
                    if values.is_empty() {
                        return Err(SearchError::InvalidSpace(format!(
                            "{}: empty discrete values",
                            spec.name
                        )));
                    }
                }
                ParamBounds::IntRange { lo, hi, step } => {
                    if lo > hi || *step <= 0 {
                        return Err(SearchError::InvalidSpace(format!(
                            "{}: invalid integer range",
                            spec.name
                        )));
                    }
                }
                ParamBounds::Uniform { lo, hi } => {
                    if lo >= hi || !lo.is_finite() || !hi.is_finite() {
                        return Err(SearchError::InvalidSpace(format!(
                            "{}: invalid uniform range",
                            spec.name
                        )));
                    }
                }
                ParamBounds::LogUniform { lo, hi } => {
                    if *lo <= 0.0 || lo >= hi || !hi.is_finite() {
                        return Err(SearchError::InvalidSpace(format!(
                            "{}: log-uniform bounds must satisfy 0 < lo < hi",
                            spec.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Total grid cardinality (product of per-parameter grid points).
    #[must_use]
    pub fn grid_cardinality(&self) -> usize {
        self.params
            .iter()
            .map(|spec| spec.grid_values().len().max(1))
            .product()
    }
}

fn linspace(lo: f64, hi: f64, steps: usize) -> Vec<f64> {
    #[allow(clippy::cast_precision_loss)]
    let denom = (steps - 1) as f64;
    (0..steps)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / denom;
            lo + (hi - lo) * t
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn spec(name: &str, bounds: ParamBounds) -> ParamSpec {
        ParamSpec {
            name: name.to_string(),
            bounds,
            grid_steps: 5,
        }
    }

    #[test]
    fn test_int_range_grid_values() {
        let spec = spec("lookback", ParamBounds::IntRange { lo: 10, hi: 30, step: 10 });
        assert_eq!(spec.grid_values(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_uniform_grid_covers_endpoints() {
        let spec = spec("threshold", ParamBounds::Uniform { lo: 0.0, hi: 1.0 });
        let values = spec.grid_values();
        assert_eq!(values.len(), 5);
        assert_relative_eq!(values[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(values[4], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_log_uniform_grid_is_geometric() {
        let spec = spec("sigma", ParamBounds::LogUniform { lo: 0.01, hi: 100.0 });
        let values = spec.grid_values();
        assert_relative_eq!(values[0], 0.01, epsilon = 1e-9);
        assert_relative_eq!(values[4], 100.0, epsilon = 1e-6);
        // Geometric spacing: constant ratio between neighbors
        assert_relative_eq!(values[1] / values[0], values[2] / values[1], epsilon = 1e-9);
    }

    #[test]
    fn test_sample_respects_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let spec_x = spec("x", ParamBounds::Uniform { lo: 2.0, hi: 3.0 });
        for _ in 0..100 {
            let v = spec_x.sample(&mut rng);
            assert!((2.0..=3.0).contains(&v));
        }

        let spec = spec("n", ParamBounds::IntRange { lo: 5, hi: 15, step: 5 });
        for _ in 0..100 {
            let v = spec.sample(&mut rng);
            assert!(v == 5.0 || v == 10.0 || v == 15.0);
        }
    }

    #[test]
    fn test_clamp_snaps_int_range() {
        let spec = spec("n", ParamBounds::IntRange { lo: 0, hi: 100, step: 10 });
        assert_relative_eq!(spec.clamp(33.0), 30.0, epsilon = 1e-12);
        assert_relative_eq!(spec.clamp(-5.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(spec.clamp(250.0), 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clamp_snaps_discrete_to_nearest() {
        let spec = spec("k", ParamBounds::Discrete { values: vec![1.0, 2.0, 8.0] });
        assert_relative_eq!(spec.clamp(2.9), 2.0, epsilon = 1e-12);
        assert_relative_eq!(spec.clamp(100.0), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        let space = ParamSpace {
            params: vec![spec("x", ParamBounds::Uniform { lo: 1.0, hi: 1.0 })],
        };
        assert!(space.validate().is_err());

        let space = ParamSpace {
            params: vec![spec("x", ParamBounds::LogUniform { lo: 0.0, hi: 1.0 })],
        };
        assert!(space.validate().is_err());

        let space = ParamSpace { params: vec![] };
        assert!(space.validate().is_err());
    }

    #[test]
    fn test_grid_cardinality() {
        let space = ParamSpace {
            params: vec![
                spec("a", ParamBounds::IntRange { lo: 1, hi: 3, step: 1 }),
                spec("b", ParamBounds::Discrete { values: vec![0.1, 0.2] }),
            ],
        };
        assert_eq!(space.grid_cardinality(), 6);
    }

    #[test]
    fn test_bounds_serde() {
        let json = serde_json::json!({
            "name": "lookback",
            "bounds": {"type": "int_range", "lo": 5, "hi": 50, "step": 5}
        });
        let spec: ParamSpec = serde_json::from_value(json).unwrap();
        assert!(matches!(spec.bounds, ParamBounds::IntRange { .. }));
        assert_eq!(spec.grid_steps, 5);
    }
}
