use serde_json::Value;

use crate::order::Order;

/// Simulation result container.
///
/// Maps are `BTreeMap`-backed throughout the engine, so serialized output is
/// byte-stable across runs of the same seed and data.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SimulationResult {
    /// Success flag
    pub ok: bool,
    /// Error information if not ok
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResult>,
    /// Order / fill log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<Order>>,
    /// Timestamped NAV series
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity_curve: Option<Vec<EquityPoint>>,
    /// Result metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResultMeta>,
}

/// Error result information
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResult {
    /// Error category
    pub category: String,
    /// Error message
    pub message: String,
    /// Additional error details
    #[serde(default)]
    pub details: Value,
}

/// Point in the equity curve
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EquityPoint {
    /// Timestamp in nanoseconds
    pub timestamp_ns: i64,
    /// Net asset value
    pub nav: f64,
    /// Cash balance
    pub cash: f64,
    /// Current drawdown (`nav / peak - 1`, <= 0)
    pub drawdown: f64,
    /// Running NAV peak
    pub peak_nav: f64,
}

/// Result metadata
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResultMeta {
    /// Simulation runtime in seconds
    #[serde(default)]
    pub runtime_seconds: f64,
    /// Number of bars processed after warmup
    #[serde(default)]
    pub bars_processed: u64,
    /// First traded bar timestamp
    #[serde(default)]
    pub start_timestamp: Option<i64>,
    /// Last traded bar timestamp
    #[serde(default)]
    pub end_timestamp: Option<i64>,
    /// Additional metadata
    #[serde(default)]
    pub extra: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_success_serde() {
        let result = SimulationResult {
            ok: true,
            error: None,
            orders: Some(vec![Order {
                timestamp_ns: 1_000,
                symbol: "BTC".to_string(),
                delta_qty: 1.0,
                reference_price: 100.0,
                fill_price: 100.1,
                commission: 0.02,
                slippage: 0.1,
                realized_pnl: 0.0,
            }]),
            equity_curve: Some(vec![EquityPoint {
                timestamp_ns: 1_000,
                nav: 100_000.0,
                cash: 99_900.0,
                drawdown: 0.0,
                peak_nav: 100_000.0,
            }]),
            meta: None,
        };

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: SimulationResult = serde_json::from_str(&json).unwrap();

        assert!(deserialized.ok);
        assert!(deserialized.error.is_none());
        assert_eq!(deserialized.orders.unwrap().len(), 1);
    }

    #[test]
    fn test_result_error_serde() {
        let result = SimulationResult {
            ok: false,
            error: Some(ErrorResult {
                category: "contract".to_string(),
                message: "negative weight".to_string(),
                details: serde_json::json!({"strategy": "momentum"}),
            }),
            orders: None,
            equity_curve: None,
            meta: None,
        };

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: SimulationResult = serde_json::from_str(&json).unwrap();

        assert!(!deserialized.ok);
        assert_eq!(deserialized.error.unwrap().category, "contract");
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let point = EquityPoint {
            timestamp_ns: 42,
            nav: 1.0,
            cash: 1.0,
            drawdown: 0.0,
            peak_nav: 1.0,
        };
        let a = serde_json::to_string(&point).unwrap();
        let b = serde_json::to_string(&point).unwrap();
        assert_eq!(a, b);
    }
}
