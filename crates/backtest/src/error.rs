//! Simulation error types.

use meridian_types::{CoreError, ErrorResult};
use serde_json::json;
use thiserror::Error;

/// Errors that can occur during simulation orchestration.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// JSON config parse error
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// Result serialization error
    #[error("result serialization error: {0}")]
    ResultSerialize(String),

    /// Data loading or validation error
    #[error("data error: {0}")]
    Data(#[from] meridian_data::DataError),

    /// Strategy error
    #[error("strategy error: {0}")]
    Strategy(#[from] meridian_strategy::StrategyError),

    /// Reconciliation error
    #[error("portfolio error: {0}")]
    Portfolio(#[from] meridian_portfolio::PortfolioError),

    /// Execution engine error
    #[error("execution error: {0}")]
    Execution(#[from] meridian_execution::ExecutionError),

    /// Strategy output contract violation (fatal for the run)
    #[error("contract violation: {0}")]
    Contract(String),

    /// A snapshot would leak future information
    #[error("causality violation: {0}")]
    Causality(String),

    /// Evaluation exceeded its wall-clock budget
    #[error("evaluation budget exceeded: {elapsed:.1}s > {budget:.1}s")]
    EvalBudgetExceeded {
        /// Elapsed wall-clock seconds
        elapsed: f64,
        /// Configured budget in seconds
        budget: f64,
    },

    /// Not enough data for warmup plus one decision bar
    #[error("insufficient data: need {required}, have {available}")]
    InsufficientData {
        /// Required number of bars
        required: usize,
        /// Available number of bars
        available: usize,
    },

    /// Date parsing error
    #[error("date parse error: {0}")]
    DateParse(String),

    /// Runtime error
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl SimulationError {
    /// Returns the error category for the output contract.
    /// Categories: `config`, `market_data`, `contract`, `execution`, `runtime`
    #[must_use]
    pub fn error_category(&self) -> &'static str {
        match self {
            SimulationError::ConfigParse(_) | SimulationError::ConfigValidation(_) => "config",

            SimulationError::Data(_)
            | SimulationError::InsufficientData { .. }
            | SimulationError::DateParse(_)
            | SimulationError::Causality(_) => "market_data",

            SimulationError::Contract(_) | SimulationError::Strategy(_) => "contract",

            SimulationError::Portfolio(_) | SimulationError::Execution(_) => "execution",

            SimulationError::ResultSerialize(_)
            | SimulationError::EvalBudgetExceeded { .. }
            | SimulationError::Runtime(_) => "runtime",
        }
    }
}

impl From<CoreError> for SimulationError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Contract(msg) => SimulationError::Contract(msg),
            other => SimulationError::Runtime(other.to_string()),
        }
    }
}

impl From<SimulationError> for ErrorResult {
    fn from(err: SimulationError) -> Self {
        Self {
            category: err.error_category().to_string(),
            message: err.to_string(),
            details: json!({}),
        }
    }
}
