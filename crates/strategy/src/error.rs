//! Strategy error types

use thiserror::Error;

/// Strategy-specific errors
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Unknown strategy name in registry
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    /// Invalid strategy parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Missing feature data for a symbol
    #[error("Missing features for symbol: {0}")]
    MissingFeatures(String),

    /// Evaluation failure inside a strategy
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StrategyError::UnknownStrategy("TestStrategy".to_string());
        assert_eq!(err.to_string(), "Unknown strategy: TestStrategy");
    }

    #[test]
    fn test_error_invalid_params() {
        let err = StrategyError::InvalidParams("lookback_bars must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid parameters: lookback_bars must be > 0"
        );
    }
}
