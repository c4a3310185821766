//! Execution error types.

use thiserror::Error;

/// Errors raised by the execution simulator.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// No fill price available for an active symbol
    #[error("missing price for symbol '{0}'")]
    MissingPrice(String),

    /// Non-finite price or exposure reached the simulator
    #[error("numeric error: {0}")]
    Numeric(String),

    /// Costs configuration file error
    #[error("costs config error: {0}")]
    CostsConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExecutionError::MissingPrice("BTC".to_string());
        assert_eq!(err.to_string(), "missing price for symbol 'BTC'");
    }
}
