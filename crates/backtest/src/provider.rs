//! Market context provider.
//!
//! Builds the point-in-time snapshot each strategy sees for one bar:
//! per-asset features, the regime label, and nothing else. Strict
//! causality: a snapshot for bar `t` derives only from bars `..=t`, and a
//! request timestamped later than the current simulated bar is refused.

use std::collections::BTreeMap;

use meridian_data::MarketStore;
use meridian_strategy::{AssetFeatures, Regime};
use meridian_types::config::ContextConfig;

use crate::error::SimulationError;

/// One bar's market snapshot, shared by all strategy slots.
#[derive(Debug, Clone)]
pub struct ProviderSnapshot {
    /// Decision bar timestamp
    pub timestamp_ns: i64,
    /// Per-asset features
    pub features: BTreeMap<String, AssetFeatures>,
    /// Regime label
    pub regime: Regime,
}

/// Causality-guarded snapshot builder over the aligned universe.
pub struct MarketContextProvider<'a> {
    config: ContextConfig,
    data: &'a MarketStore,
}

impl<'a> MarketContextProvider<'a> {
    /// Creates a provider over the given store.
    #[must_use]
    pub fn new(config: ContextConfig, data: &'a MarketStore) -> Self {
        Self { config, data }
    }

    /// Builds the snapshot for bar `idx`.
    ///
    /// `now_ns` is the engine's current simulated bar time; a snapshot whose
    /// bar timestamp lies after it would leak future information and is
    /// refused.
    ///
    /// # Errors
    /// - [`SimulationError::Causality`] when `idx` is past `now_ns`.
    /// - [`SimulationError::Runtime`] when `idx` is out of bounds.
    pub fn snapshot_at(&self, idx: usize, now_ns: i64) -> Result<ProviderSnapshot, SimulationError> {
        let timestamp_ns = *self
            .data
            .timestamps
            .get(idx)
            .ok_or_else(|| SimulationError::Runtime(format!("bar index {idx} out of bounds")))?;

        if timestamp_ns > now_ns {
            return Err(SimulationError::Causality(format!(
                "snapshot for bar {timestamp_ns} requested at {now_ns}"
            )));
        }

        let mut features = BTreeMap::new();
        for (symbol, bars) in &self.data.series {
            features.insert(symbol.clone(), self.asset_features(bars, idx));
        }

        Ok(ProviderSnapshot {
            timestamp_ns,
            features,
            regime: self.classify_regime(idx),
        })
    }

    fn asset_features(&self, bars: &[meridian_types::Bar], idx: usize) -> AssetFeatures {
        let last_close = bars[idx].close;
        let lookback = self.config.feature_lookback_bars.min(idx);

        let trailing_return = if lookback > 0 {
            let base = bars[idx - lookback].close;
            if base > 0.0 {
                last_close / base - 1.0
            } else {
                0.0
            }
        } else {
            0.0
        };

        let volatility = if lookback >= 2 {
            let returns: Vec<f64> = (idx - lookback..idx)
                .filter(|i| bars[*i].close > 0.0)
                .map(|i| bars[i + 1].close / bars[i].close - 1.0)
                .collect();
            std_dev(&returns)
        } else {
            0.0
        };

        AssetFeatures {
            last_close,
            trailing_return,
            volatility,
        }
    }

    /// Equal-weighted trailing universe return against the trend threshold.
    fn classify_regime(&self, idx: usize) -> Regime {
        let lookback = self.config.regime_lookback_bars.min(idx);
        if lookback == 0 {
            return Regime::Sideways;
        }

        let mut sum = 0.0;
        let mut count = 0usize;
        for bars in self.data.series.values() {
            let base = bars[idx - lookback].close;
            if base > 0.0 {
                sum += bars[idx].close / base - 1.0;
                count += 1;
            }
        }
        if count == 0 {
            return Regime::Sideways;
        }

        #[allow(clippy::cast_precision_loss)]
        let mean = sum / count as f64;
        if mean >= self.config.regime_threshold {
            Regime::TrendingUp
        } else if mean <= -self.config.regime_threshold {
            Regime::TrendingDown
        } else {
            Regime::Sideways
        }
    }
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
