//! Bar stores for single symbols and the aligned universe.

use std::collections::BTreeMap;

use meridian_types::Bar;

use crate::error::DataError;

/// Bars for one symbol.
#[derive(Debug, Clone)]
pub struct BarStore {
    /// Symbol identifier.
    pub symbol: String,
    /// Bars in strictly ascending timestamp order.
    pub bars: Vec<Bar>,
}

impl BarStore {
    /// Returns the number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns `true` if there are no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// The aligned universe: every symbol carries a bar for every shared
/// timestamp, so a single index addresses one simulated instant across the
/// whole book.
#[derive(Debug, Clone)]
pub struct MarketStore {
    /// Shared timestamps in strictly ascending order.
    pub timestamps: Vec<i64>,
    /// Per-symbol bar series, each the same length as `timestamps`.
    pub series: BTreeMap<String, Vec<Bar>>,
}

impl MarketStore {
    /// Returns the number of aligned bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Returns `true` if there are no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Symbols in the universe.
    pub fn symbols(&self) -> impl Iterator<Item = &String> {
        self.series.keys()
    }

    /// Bar for `symbol` at `idx`.
    #[must_use]
    pub fn bar(&self, symbol: &str, idx: usize) -> Option<&Bar> {
        self.series.get(symbol).and_then(|bars| bars.get(idx))
    }

    /// Close prices across the universe at `idx`.
    #[must_use]
    pub fn closes_at(&self, idx: usize) -> BTreeMap<String, f64> {
        self.series
            .iter()
            .filter_map(|(symbol, bars)| bars.get(idx).map(|bar| (symbol.clone(), bar.close)))
            .collect()
    }

    /// Open prices across the universe at `idx`.
    #[must_use]
    pub fn opens_at(&self, idx: usize) -> BTreeMap<String, f64> {
        self.series
            .iter()
            .filter_map(|(symbol, bars)| bars.get(idx).map(|bar| (symbol.clone(), bar.open)))
            .collect()
    }

    /// Slices the store to `[start_ns, end_ns]` inclusive.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidRange`] when the range is inverted and
    /// [`DataError::EmptyData`] when no bars fall inside it.
    pub fn slice_by_time(&self, start_ns: i64, end_ns: i64) -> Result<MarketStore, DataError> {
        if start_ns > end_ns {
            return Err(DataError::InvalidRange(format!(
                "start {start_ns} after end {end_ns}"
            )));
        }

        let from = self.timestamps.partition_point(|&ts| ts < start_ns);
        let to = self.timestamps.partition_point(|&ts| ts <= end_ns);
        if from >= to {
            return Err(DataError::EmptyData);
        }

        let series = self
            .series
            .iter()
            .map(|(symbol, bars)| (symbol.clone(), bars[from..to].to_vec()))
            .collect();

        Ok(MarketStore {
            timestamps: self.timestamps[from..to].to_vec(),
            series,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const STEP_NS: i64 = 86_400_000_000_000;

    fn make_bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(idx, close)| Bar {
                timestamp_ns: idx as i64 * STEP_NS,
                open: *close,
                high: close * 1.01,
                low: close * 0.99,
                close: *close,
                volume: 1_000.0,
            })
            .collect()
    }

    fn make_store() -> MarketStore {
        let btc = make_bars(&[100.0, 101.0, 102.0, 103.0]);
        let eth = make_bars(&[10.0, 10.1, 10.2, 10.3]);
        let timestamps = btc.iter().map(|b| b.timestamp_ns).collect();
        let mut series = BTreeMap::new();
        series.insert("BTC".to_string(), btc);
        series.insert("ETH".to_string(), eth);
        MarketStore { timestamps, series }
    }

    #[test]
    fn test_closes_at_returns_universe_snapshot() {
        let store = make_store();
        let closes = store.closes_at(1);
        assert_relative_eq!(closes["BTC"], 101.0, epsilon = 1e-10);
        assert_relative_eq!(closes["ETH"], 10.1, epsilon = 1e-10);
    }

    #[test]
    fn test_slice_by_time_inclusive_bounds() {
        let store = make_store();
        let sliced = store.slice_by_time(STEP_NS, 2 * STEP_NS).unwrap();
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.timestamps[0], STEP_NS);
        assert_relative_eq!(sliced.series["BTC"][1].close, 102.0, epsilon = 1e-10);
    }

    #[test]
    fn test_slice_by_time_empty_range() {
        let store = make_store();
        let result = store.slice_by_time(100 * STEP_NS, 200 * STEP_NS);
        assert!(matches!(result, Err(DataError::EmptyData)));
    }

    #[test]
    fn test_slice_by_time_inverted_range() {
        let store = make_store();
        let result = store.slice_by_time(2 * STEP_NS, STEP_NS);
        assert!(matches!(result, Err(DataError::InvalidRange(_))));
    }
}
