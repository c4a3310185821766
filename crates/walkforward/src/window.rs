//! Window plans for walk-forward validation.

use serde::{Deserialize, Serialize};

use crate::error::WalkForwardError;

/// One dated window of history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Window identifier for reports
    pub id: String,
    /// Start date (ISO format, inclusive)
    pub start_date: String,
    /// End date (ISO format, inclusive)
    pub end_date: String,
    /// Marks a historically declining market
    #[serde(default)]
    pub adverse: bool,
}

/// The training window plus one-or-more validation windows.
///
/// Validation windows must include at least one adverse-regime window: a
/// parameter set validated only against a favorable market gives a false
/// sense of generalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardPlan {
    /// In-sample training window
    pub train: WindowSpec,
    /// Out-of-sample validation windows
    pub validation: Vec<WindowSpec>,
}

impl WalkForwardPlan {
    /// Validates the plan structure.
    ///
    /// # Errors
    /// Returns [`WalkForwardError::InvalidPlan`] when there are no
    /// validation windows, no adverse window, or duplicated window ids.
    pub fn validate(&self) -> Result<(), WalkForwardError> {
        if self.validation.is_empty() {
            return Err(WalkForwardError::InvalidPlan(
                "no validation windows".to_string(),
            ));
        }

        if !self.validation.iter().any(|w| w.adverse) {
            return Err(WalkForwardError::InvalidPlan(
                "at least one validation window must be adverse".to_string(),
            ));
        }

        let mut ids: Vec<&str> = self.validation.iter().map(|w| w.id.as_str()).collect();
        ids.push(self.train.id.as_str());
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        if ids.len() != before {
            return Err(WalkForwardError::InvalidPlan(
                "duplicate window ids".to_string(),
            ));
        }

        Ok(())
    }
}
