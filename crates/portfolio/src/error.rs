//! Portfolio error types.

use thiserror::Error;

/// Errors raised during reconciliation.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// A strategy output has no matching budget entry
    #[error("no budget for strategy '{0}'")]
    MissingBudget(String),

    /// Budget fractions are malformed
    #[error("invalid budget: {0}")]
    InvalidBudget(String),

    /// Duplicate output for one strategy in a single bar
    #[error("duplicate output for strategy '{0}'")]
    DuplicateOutput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortfolioError::MissingBudget("momentum".to_string());
        assert_eq!(err.to_string(), "no budget for strategy 'momentum'");
    }
}
