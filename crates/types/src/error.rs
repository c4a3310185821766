use thiserror::Error;

/// Core error types for Meridian
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error
    #[error("Data error: {0}")]
    Data(String),

    /// Strategy contract violation (malformed output)
    #[error("Contract violation: {0}")]
    Contract(String),

    /// Execution error
    #[error("Execution error: {0}")]
    Execution(String),

    /// Portfolio error
    #[error("Portfolio error: {0}")]
    Portfolio(String),

    /// Search error
    #[error("Search error: {0}")]
    Search(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
