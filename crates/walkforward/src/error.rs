//! Walk-forward error types.

use thiserror::Error;

/// Errors raised while constructing a validation plan.
#[derive(Debug, Error)]
pub enum WalkForwardError {
    /// Malformed window plan
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// Malformed acceptance criteria
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),
}
