use std::collections::HashMap;
use std::path::{Path, PathBuf};

use arrow::array::{Float64Array, Int64Array, TimestampNanosecondArray};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::DataError;
use crate::store::{BarStore, MarketStore};
use crate::validation::{align_universe, validate_bars};
use meridian_types::Bar;

/// Resolve a Parquet bar path using the canonical layout or an env override.
pub fn resolve_data_path(symbol: &str, timeframe: &str) -> PathBuf {
    let root =
        std::env::var("MERIDIAN_DATA_PARQUET_ROOT").unwrap_or_else(|_| "data/parquet".to_string());

    PathBuf::from(root)
        .join(symbol)
        .join(format!("{symbol}_{timeframe}.parquet"))
}

/// Loads bars from a Parquet file with schema:
/// `UTC time` (timestamp ns), `Open`, `High`, `Low`, `Close`, `Volume`.
/// Duplicates with identical OHLCV are deduplicated (keep-first); divergent
/// duplicates error.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
    let file = std::fs::File::open(path)
        .map_err(|e| DataError::FileNotFound(path.display().to_string(), e.to_string()))?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::ParseError(e.to_string()))?;
    let reader = builder
        .build()
        .map_err(|e| DataError::ParseError(e.to_string()))?;

    let mut bars = Vec::new();
    let mut seen: HashMap<i64, Bar> = HashMap::new();
    let mut last_ts: Option<i64> = None;
    let mut processed_rows = 0usize;

    for batch_result in reader {
        let batch = batch_result.map_err(|e| DataError::ParseError(e.to_string()))?;

        let ts_col = batch
            .column_by_name("UTC time")
            .ok_or_else(|| DataError::MissingColumn("UTC time".to_string()))?;
        let ts_arr = ts_col
            .as_any()
            .downcast_ref::<TimestampNanosecondArray>()
            .ok_or_else(|| DataError::InvalidColumnType("UTC time".to_string()))?;

        let open_arr = numeric_f64_column(&batch, "Open")?;
        let high_arr = numeric_f64_column(&batch, "High")?;
        let low_arr = numeric_f64_column(&batch, "Low")?;
        let close_arr = numeric_f64_column(&batch, "Close")?;
        let volume_arr = numeric_f64_or_i64_column(&batch, "Volume")?;

        for row_idx in 0..batch.num_rows() {
            let ts = ts_arr.value(row_idx);
            if let Some(prev) = last_ts {
                if ts < prev {
                    return Err(DataError::CorruptData(format!(
                        "out-of-order timestamp at row {}: {} < {}",
                        processed_rows + row_idx,
                        ts,
                        prev
                    )));
                }
            }

            let bar = Bar {
                timestamp_ns: ts,
                open: open_arr.value(row_idx),
                high: high_arr.value(row_idx),
                low: low_arr.value(row_idx),
                close: close_arr.value(row_idx),
                volume: volume_arr.value(row_idx),
            };

            match seen.get(&ts) {
                Some(existing) => {
                    if !same_bar(existing, &bar) {
                        return Err(DataError::CorruptData(format!(
                            "divergent duplicate timestamp {} at row {}",
                            ts,
                            processed_rows + row_idx
                        )));
                    }
                }
                None => {
                    seen.insert(ts, bar);
                    last_ts = Some(ts);
                    bars.push(bar);
                }
            }
        }

        processed_rows += batch.num_rows();
    }

    if bars.is_empty() {
        return Err(DataError::EmptyData);
    }

    Ok(bars)
}

/// Convenience: load, validate, and align the whole universe.
///
/// # Errors
/// Propagates loader, validation, and alignment failures.
pub fn load_universe(symbols: &[String], timeframe: &str) -> Result<MarketStore, DataError> {
    let mut stores = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let path = resolve_data_path(symbol, timeframe);
        let bars = load_bars(&path)?;
        validate_bars(symbol, &bars)?;
        stores.push(BarStore {
            symbol: symbol.clone(),
            bars,
        });
    }

    align_universe(stores)
}

fn same_bar(a: &Bar, b: &Bar) -> bool {
    a.open == b.open
        && a.high == b.high
        && a.low == b.low
        && a.close == b.close
        && a.volume == b.volume
}

enum NumericAccessor<'a> {
    F64(&'a Float64Array),
    I64(&'a Int64Array),
}

impl NumericAccessor<'_> {
    fn value(&self, idx: usize) -> f64 {
        match self {
            NumericAccessor::F64(arr) => arr.value(idx),
            #[allow(clippy::cast_precision_loss)]
            NumericAccessor::I64(arr) => arr.value(idx) as f64,
        }
    }
}

fn numeric_f64_column<'a>(
    batch: &'a arrow::record_batch::RecordBatch,
    name: &str,
) -> Result<&'a Float64Array, DataError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
    col.as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| DataError::InvalidColumnType(name.to_string()))
}

fn numeric_f64_or_i64_column<'a>(
    batch: &'a arrow::record_batch::RecordBatch,
    name: &str,
) -> Result<NumericAccessor<'a>, DataError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;

    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(NumericAccessor::F64(arr))
    } else if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
        Ok(NumericAccessor::I64(arr))
    } else {
        Err(DataError::InvalidColumnType(name.to_string()))
    }
}
