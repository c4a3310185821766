//! Integrity checks and universe alignment.

use std::collections::{BTreeMap, BTreeSet};

use meridian_types::Bar;

use crate::error::DataError;
use crate::store::{BarStore, MarketStore};

/// Validates a bar series before it may enter a simulation.
///
/// Checks:
/// - strictly ascending timestamps (duplicates are the loader's concern)
/// - all prices finite and positive
/// - `low <= open, close <= high`
///
/// # Errors
/// Returns [`DataError::CorruptData`] naming the first offending bar.
pub fn validate_bars(symbol: &str, bars: &[Bar]) -> Result<(), DataError> {
    if bars.is_empty() {
        return Err(DataError::EmptyData);
    }

    let mut last_ts = None;
    for (idx, bar) in bars.iter().enumerate() {
        if let Some(prev) = last_ts {
            if bar.timestamp_ns <= prev {
                return Err(DataError::CorruptData(format!(
                    "{symbol}: non-increasing timestamp at index {idx}: {} <= {prev}",
                    bar.timestamp_ns
                )));
            }
        }
        last_ts = Some(bar.timestamp_ns);

        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(DataError::CorruptData(format!(
                "{symbol}: non-positive or non-finite price at index {idx}"
            )));
        }
        if bar.high < bar.low
            || bar.open > bar.high
            || bar.open < bar.low
            || bar.close > bar.high
            || bar.close < bar.low
        {
            return Err(DataError::CorruptData(format!(
                "{symbol}: inconsistent OHLC at index {idx}"
            )));
        }
        if bar.volume < 0.0 || !bar.volume.is_finite() {
            return Err(DataError::CorruptData(format!(
                "{symbol}: invalid volume at index {idx}"
            )));
        }
    }

    Ok(())
}

/// Aligns per-symbol stores onto their shared timestamps.
///
/// Only timestamps present in **every** store survive; a symbol missing more
/// than `max_dropped_fraction` of the shared grid is an alignment failure
/// rather than a silent shrink.
///
/// # Errors
/// Returns [`DataError::AlignmentFailure`] when the intersection is empty or
/// a store loses too many bars.
pub fn align_universe(stores: Vec<BarStore>) -> Result<MarketStore, DataError> {
    const MAX_DROPPED_FRACTION: f64 = 0.5;

    if stores.is_empty() {
        return Err(DataError::AlignmentFailure("no symbols".to_string()));
    }

    let mut shared: Option<BTreeSet<i64>> = None;
    for store in &stores {
        let timestamps: BTreeSet<i64> = store.bars.iter().map(|b| b.timestamp_ns).collect();
        shared = Some(match shared {
            None => timestamps,
            Some(acc) => acc.intersection(&timestamps).copied().collect(),
        });
    }

    let shared = shared.unwrap_or_default();
    if shared.is_empty() {
        return Err(DataError::AlignmentFailure(
            "no shared timestamps across universe".to_string(),
        ));
    }

    let mut series = BTreeMap::new();
    for store in stores {
        let original_len = store.bars.len();
        let aligned: Vec<Bar> = store
            .bars
            .into_iter()
            .filter(|bar| shared.contains(&bar.timestamp_ns))
            .collect();

        let dropped = original_len - aligned.len();
        #[allow(clippy::cast_precision_loss)]
        let dropped_fraction = dropped as f64 / original_len as f64;
        if dropped_fraction > MAX_DROPPED_FRACTION {
            return Err(DataError::AlignmentFailure(format!(
                "{}: {dropped} of {original_len} bars outside shared grid",
                store.symbol
            )));
        }
        if dropped > 0 {
            tracing::debug!("{}: dropped {dropped} unaligned bars", store.symbol);
        }

        series.insert(store.symbol, aligned);
    }

    Ok(MarketStore {
        timestamps: shared.into_iter().collect(),
        series,
    })
}

/// Filters bars to `[start_ns, end_ns]` inclusive.
///
/// # Errors
/// Returns [`DataError::EmptyData`] when nothing falls inside the range.
pub fn filter_by_date_range(bars: &[Bar], start_ns: i64, end_ns: i64) -> Result<Vec<Bar>, DataError> {
    if start_ns > end_ns {
        return Err(DataError::InvalidRange(format!(
            "start {start_ns} after end {end_ns}"
        )));
    }

    let filtered: Vec<Bar> = bars
        .iter()
        .filter(|bar| bar.timestamp_ns >= start_ns && bar.timestamp_ns <= end_ns)
        .copied()
        .collect();

    if filtered.is_empty() {
        return Err(DataError::EmptyData);
    }
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP_NS: i64 = 60_000_000_000;

    fn make_bar(ts: i64, close: f64) -> Bar {
        Bar {
            timestamp_ns: ts,
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn test_validate_accepts_clean_series() {
        let bars = vec![make_bar(0, 100.0), make_bar(STEP_NS, 101.0)];
        assert!(validate_bars("BTC", &bars).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_order() {
        let bars = vec![make_bar(STEP_NS, 100.0), make_bar(0, 101.0)];
        let err = validate_bars("BTC", &bars).unwrap_err();
        assert!(matches!(err, DataError::CorruptData(_)));
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let mut bar = make_bar(0, 100.0);
        bar.low = -1.0;
        let err = validate_bars("BTC", &[bar]).unwrap_err();
        assert!(matches!(err, DataError::CorruptData(_)));
    }

    #[test]
    fn test_validate_rejects_ohlc_inconsistency() {
        let mut bar = make_bar(0, 100.0);
        bar.high = 90.0; // below low
        assert!(validate_bars("BTC", &[bar]).is_err());
    }

    #[test]
    fn test_align_intersects_timestamps() {
        let btc = BarStore {
            symbol: "BTC".to_string(),
            bars: vec![make_bar(0, 1.0), make_bar(STEP_NS, 2.0), make_bar(2 * STEP_NS, 3.0)],
        };
        let eth = BarStore {
            symbol: "ETH".to_string(),
            bars: vec![make_bar(STEP_NS, 10.0), make_bar(2 * STEP_NS, 11.0)],
        };

        let market = align_universe(vec![btc, eth]).unwrap();
        assert_eq!(market.len(), 2);
        assert_eq!(market.timestamps, vec![STEP_NS, 2 * STEP_NS]);
        assert_eq!(market.series["BTC"].len(), 2);
    }

    #[test]
    fn test_align_fails_on_disjoint_series() {
        let btc = BarStore {
            symbol: "BTC".to_string(),
            bars: vec![make_bar(0, 1.0)],
        };
        let eth = BarStore {
            symbol: "ETH".to_string(),
            bars: vec![make_bar(STEP_NS, 10.0)],
        };

        let result = align_universe(vec![btc, eth]);
        assert!(matches!(result, Err(DataError::AlignmentFailure(_))));
    }

    #[test]
    fn test_filter_by_date_range() {
        let bars: Vec<Bar> = (0..5).map(|i| make_bar(i * STEP_NS, 100.0)).collect();
        let filtered = filter_by_date_range(&bars, STEP_NS, 3 * STEP_NS).unwrap();
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered[0].timestamp_ns, STEP_NS);
    }
}
