//! Per-candidate validation state machine.
//!
//! `Train -> Validate(window 1..k) -> Accept | Reject`. Rejection is
//! terminal for the candidate within the campaign and is recorded with its
//! degradation metrics: a first-class negative outcome, never silently
//! discarded.

use meridian_types::{FitnessRecord, ParameterSet};
use serde::{Deserialize, Serialize};

use crate::error::WalkForwardError;
use crate::window::{WalkForwardPlan, WindowSpec};

/// Acceptance criteria for one campaign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValidationCriteria {
    /// Minimum composite score every validation window must clear
    #[serde(default)]
    pub min_window_score: f64,
    /// Maximum tolerated degradation vs. the training score (0.3 = 30%)
    #[serde(default = "default_max_degradation")]
    pub max_degradation_pct: f64,
}

fn default_max_degradation() -> f64 {
    0.30
}

impl Default for ValidationCriteria {
    fn default() -> Self {
        Self {
            min_window_score: 0.0,
            max_degradation_pct: default_max_degradation(),
        }
    }
}

impl ValidationCriteria {
    fn validate(self) -> Result<(), WalkForwardError> {
        if self.max_degradation_pct <= 0.0 {
            return Err(WalkForwardError::InvalidCriteria(
                "max_degradation_pct must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fitness of one validation window with its degradation vs. training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Window identifier
    pub window_id: String,
    /// Out-of-sample fitness on this window
    pub fitness: FitnessRecord,
    /// `(train_score - window_score) / |train_score|`
    pub degradation_pct: f64,
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// Training itself was infeasible
    InfeasibleTraining,
    /// A window scored below the floor
    BelowFloor {
        /// Observed window score
        score: f64,
        /// Configured floor
        floor: f64,
    },
    /// Degradation vs. training exceeded the ceiling
    Degradation {
        /// Observed degradation
        degradation_pct: f64,
        /// Configured ceiling
        ceiling: f64,
    },
}

/// Terminal verdict for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Every validation window passed
    Accepted,
    /// Terminal rejection at the named window
    Rejected {
        /// Window that failed
        window_id: String,
        /// Why it failed
        reason: RejectReason,
    },
}

impl Verdict {
    /// Whether the candidate was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Full validation record for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardReport {
    /// The validated parameter set
    pub parameter_set: ParameterSet,
    /// In-sample training fitness
    pub train_fitness: FitnessRecord,
    /// Per-window results, in plan order, up to the terminal window
    pub windows: Vec<ValidationResult>,
    /// Terminal verdict
    pub verdict: Verdict,
}

/// Walk-forward validator for one plan and criteria.
pub struct WalkForwardValidator {
    plan: WalkForwardPlan,
    criteria: ValidationCriteria,
}

impl WalkForwardValidator {
    /// Creates a validator, checking plan and criteria up front.
    ///
    /// # Errors
    /// Returns [`WalkForwardError`] for a malformed plan (including a plan
    /// with no adverse validation window) or criteria.
    pub fn new(
        plan: WalkForwardPlan,
        criteria: ValidationCriteria,
    ) -> Result<Self, WalkForwardError> {
        plan.validate()?;
        criteria.validate()?;
        Ok(Self { plan, criteria })
    }

    /// The validated plan.
    #[must_use]
    pub fn plan(&self) -> &WalkForwardPlan {
        &self.plan
    }

    /// Runs the state machine for one candidate.
    ///
    /// `evaluate` runs a full backtest of the candidate over one window and
    /// scores it; it is called once for training and once per validation
    /// window, stopping at the first rejection.
    pub fn validate<F>(&self, candidate: ParameterSet, mut evaluate: F) -> WalkForwardReport
    where
        F: FnMut(&ParameterSet, &WindowSpec) -> FitnessRecord,
    {
        let train_fitness = evaluate(&candidate, &self.plan.train);

        if !train_fitness.feasible {
            tracing::warn!(
                fingerprint = %candidate.fingerprint(),
                "candidate rejected: infeasible on training window"
            );
            return WalkForwardReport {
                parameter_set: candidate,
                train_fitness,
                windows: Vec::new(),
                verdict: Verdict::Rejected {
                    window_id: self.plan.train.id.clone(),
                    reason: RejectReason::InfeasibleTraining,
                },
            };
        }

        let train_score = train_fitness.composite_score;
        let mut windows = Vec::with_capacity(self.plan.validation.len());

        for window in &self.plan.validation {
            let fitness = evaluate(&candidate, window);
            let window_score = fitness.composite_score;
            let degradation_pct = degradation(train_score, window_score);

            windows.push(ValidationResult {
                window_id: window.id.clone(),
                fitness,
                degradation_pct,
            });

            let reason = if window_score < self.criteria.min_window_score {
                Some(RejectReason::BelowFloor {
                    score: window_score,
                    floor: self.criteria.min_window_score,
                })
            } else if degradation_pct > self.criteria.max_degradation_pct {
                Some(RejectReason::Degradation {
                    degradation_pct,
                    ceiling: self.criteria.max_degradation_pct,
                })
            } else {
                None
            };

            if let Some(reason) = reason {
                tracing::warn!(
                    fingerprint = %candidate.fingerprint(),
                    window = %window.id,
                    degradation_pct,
                    "candidate rejected by walk-forward validation"
                );
                return WalkForwardReport {
                    parameter_set: candidate,
                    train_fitness,
                    windows,
                    verdict: Verdict::Rejected {
                        window_id: window.id.clone(),
                        reason,
                    },
                };
            }
        }

        tracing::info!(
            fingerprint = %candidate.fingerprint(),
            train_score,
            "candidate accepted"
        );
        WalkForwardReport {
            parameter_set: candidate,
            train_fitness,
            windows,
            verdict: Verdict::Accepted,
        }
    }
}

/// `(train - window) / |train|`; a zero training score degrades only when
/// the window underperforms it.
fn degradation(train_score: f64, window_score: f64) -> f64 {
    if train_score.abs() < f64::EPSILON {
        return if window_score < train_score {
            f64::INFINITY
        } else {
            0.0
        };
    }
    (train_score - window_score) / train_score.abs()
}
