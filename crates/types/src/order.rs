//! Simulated order / fill record.

/// One simulated order, filled at the configured reference price.
///
/// Orders double as the fill log: bar-level simulation fills every order it
/// creates, so a separate fill record would carry no extra information.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Order {
    /// Fill bar timestamp in nanoseconds
    pub timestamp_ns: i64,
    /// Symbol traded
    pub symbol: String,
    /// Signed quantity delta (positive = buy)
    pub delta_qty: f64,
    /// Reference price before slippage (next-bar open)
    pub reference_price: f64,
    /// Actual fill price after slippage
    pub fill_price: f64,
    /// Commission charged
    pub commission: f64,
    /// Slippage applied in price units
    pub slippage: f64,
    /// Realized PnL against average cost for the reducing part of the fill
    /// (0 for pure position adds)
    pub realized_pnl: f64,
}

impl Order {
    /// Notional value of the fill.
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.delta_qty.abs() * self.fill_price
    }
}
