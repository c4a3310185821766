//! Composite score weighting.

use serde::{Deserialize, Serialize};

/// Weights for the composite optimization objective.
///
/// The composite is the linear blend
/// `sharpe_weight * Sharpe + cagr_weight * CAGR + win_rate_weight * WinRate
/// - drawdown_weight * |MaxDrawdown|`.
///
/// The defaults (0.4 / 0.3 / 0.2 / 0.1) are contract material: with inputs
/// `(sharpe = 1.5, cagr = 0.15, win_rate = 0.6, max_dd = -0.10)` the
/// composite is exactly `0.785`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight on the annualized Sharpe ratio
    #[serde(default = "default_sharpe_weight")]
    pub sharpe_weight: f64,
    /// Weight on CAGR
    #[serde(default = "default_cagr_weight")]
    pub cagr_weight: f64,
    /// Weight on win rate
    #[serde(default = "default_win_rate_weight")]
    pub win_rate_weight: f64,
    /// Penalty weight on |max drawdown|
    #[serde(default = "default_drawdown_weight")]
    pub drawdown_weight: f64,
}

fn default_sharpe_weight() -> f64 {
    0.4
}
fn default_cagr_weight() -> f64 {
    0.3
}
fn default_win_rate_weight() -> f64 {
    0.2
}
fn default_drawdown_weight() -> f64 {
    0.1
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            sharpe_weight: default_sharpe_weight(),
            cagr_weight: default_cagr_weight(),
            win_rate_weight: default_win_rate_weight(),
            drawdown_weight: default_drawdown_weight(),
        }
    }
}

impl ScoreWeights {
    /// The weighted composite score.
    #[must_use]
    pub fn composite(&self, sharpe: f64, cagr: f64, win_rate: f64, max_drawdown: f64) -> f64 {
        self.sharpe_weight * sharpe + self.cagr_weight * cagr
            + self.win_rate_weight * win_rate
            - self.drawdown_weight * max_drawdown.abs()
    }
}
