/// A single OHLCV bar.
/// `timestamp_ns` is the **open time** (not close time).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bar {
    /// Unix epoch nanoseconds UTC (open time)
    pub timestamp_ns: i64,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_serde_roundtrip() {
        let bar = Bar {
            timestamp_ns: 1_234_567_890_000_000_000,
            open: 100.0,
            high: 101.5,
            low: 99.2,
            close: 100.8,
            volume: 12_000.0,
        };

        let json = serde_json::to_string(&bar).unwrap();
        let deserialized: Bar = serde_json::from_str(&json).unwrap();

        assert_eq!(bar, deserialized);
    }
}
