//! Search error types.

use thiserror::Error;

/// Errors raised while setting up or running a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Malformed parameter space
    #[error("invalid parameter space: {0}")]
    InvalidSpace(String),

    /// Malformed search method configuration
    #[error("invalid search method: {0}")]
    InvalidMethod(String),
}
