//! Simulation result assembly helpers.

use meridian_types::{EquityPoint, Order, ResultMeta, SimulationResult};

/// Builds a successful simulation result payload.
#[must_use]
pub(crate) fn build_result(
    orders: Vec<Order>,
    equity_curve: Vec<EquityPoint>,
    meta: ResultMeta,
) -> SimulationResult {
    SimulationResult {
        ok: true,
        error: None,
        orders: Some(orders),
        equity_curve: Some(equity_curve),
        meta: Some(meta),
    }
}

/// Builds metadata for a simulation result.
#[must_use]
pub(crate) fn build_meta(
    timestamps: &[i64],
    warmup_bars: usize,
    runtime_seconds: f64,
    extra: serde_json::Value,
) -> ResultMeta {
    let start_timestamp = timestamps.get(warmup_bars).copied();
    let end_timestamp = timestamps.last().copied();
    let bars_processed = timestamps.len().saturating_sub(warmup_bars) as u64;

    ResultMeta {
        runtime_seconds,
        bars_processed,
        start_timestamp,
        end_timestamp,
        extra,
    }
}
