//! Campaign error types.

use thiserror::Error;

/// Errors raised while setting up or running a campaign.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// A searched parameter names no config field
    #[error("unknown parameter path: {0}")]
    UnknownParameter(String),

    /// Campaign configuration error
    #[error("campaign config error: {0}")]
    Config(String),

    /// Search setup error
    #[error("search error: {0}")]
    Search(#[from] meridian_search::SearchError),

    /// Walk-forward plan error
    #[error("walk-forward error: {0}")]
    WalkForward(#[from] meridian_walkforward::WalkForwardError),

    /// Base simulation config error
    #[error("simulation error: {0}")]
    Simulation(#[from] meridian_backtest::SimulationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CampaignError::UnknownParameter("risk.bogus".to_string());
        assert_eq!(err.to_string(), "unknown parameter path: risk.bogus");
    }
}
