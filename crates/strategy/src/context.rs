//! Per-bar context snapshot for strategy execution.
//!
//! Provides a read-only, point-in-time view of the market for the
//! `Strategy::evaluate()` method. The provider that builds it guarantees
//! strict causality: nothing in a `Context` may derive from bars after
//! `timestamp_ns`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Coarse market-condition label from the external classifier boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Trailing universe return above the trend threshold
    TrendingUp,
    /// Trailing universe return below the negative trend threshold
    TrendingDown,
    /// Neither
    #[default]
    Sideways,
}

/// Point-in-time features for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetFeatures {
    /// Close of the decision bar
    pub last_close: f64,
    /// Simple return over the feature lookback window
    pub trailing_return: f64,
    /// Std-dev of bar returns over the feature lookback window
    pub volatility: f64,
}

/// Read-only snapshot handed to one strategy for one decision bar.
///
/// `current_exposures` is the strategy's own NAV-relative book as of the
/// *previous settled bar*, never the bar being decided. A holding strategy
/// echoes it back verbatim; the reconciler then copies it through without
/// re-applying budget fraction or leverage.
#[derive(Debug, Clone)]
pub struct Context {
    /// Decision bar timestamp in nanoseconds
    pub timestamp_ns: i64,
    /// Per-asset features as of this bar
    pub features: BTreeMap<String, AssetFeatures>,
    /// Market regime label
    pub regime: Regime,
    /// This strategy's budget fraction (0-1)
    pub budget_fraction: f64,
    /// This strategy's NAV-relative book as of the previous settled bar
    pub current_exposures: BTreeMap<String, f64>,
}

impl Context {
    /// Returns true when the strategy currently holds any exposure.
    #[must_use]
    pub fn has_exposure(&self) -> bool {
        self.current_exposures.values().any(|e| e.abs() > 0.0)
    }
}
