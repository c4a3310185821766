//! Portfolio state.

use std::collections::BTreeMap;

/// One position lot.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PositionLot {
    /// Signed quantity (negative = short)
    pub qty: f64,
    /// Average cost per unit
    pub avg_cost: f64,
}

/// Mutable portfolio state for one simulation run.
///
/// Mutated only by the execution simulator, once per bar, after all fills
/// for the bar have been computed. `peak_nav` is monotonically
/// non-decreasing except on reset; `drawdown = nav / peak_nav - 1` (<= 0).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PortfolioState {
    /// Net asset value (cash + marked positions)
    pub nav: f64,
    /// Cash balance
    pub cash: f64,
    /// Open positions by symbol
    pub positions: BTreeMap<String, PositionLot>,
    /// Running NAV peak
    pub peak_nav: f64,
    /// Current drawdown, `nav / peak_nav - 1`
    pub drawdown: f64,
}

impl PortfolioState {
    /// Creates a fresh all-cash state.
    #[must_use]
    pub fn new(initial_nav: f64) -> Self {
        Self {
            nav: initial_nav,
            cash: initial_nav,
            positions: BTreeMap::new(),
            peak_nav: initial_nav,
            drawdown: 0.0,
        }
    }

    /// Marked value of one position at `price`, or 0 if flat.
    #[must_use]
    pub fn position_value(&self, symbol: &str, price: f64) -> f64 {
        self.positions
            .get(symbol)
            .map_or(0.0, |lot| lot.qty * price)
    }

    /// NAV-relative exposures of all positions at the given prices.
    ///
    /// Symbols with no price in `prices` are skipped.
    #[must_use]
    pub fn exposures(&self, prices: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        if self.nav <= 0.0 {
            return out;
        }
        for (symbol, lot) in &self.positions {
            if let Some(price) = prices.get(symbol) {
                out.insert(symbol.clone(), lot.qty * price / self.nav);
            }
        }
        out
    }

    /// Re-marks NAV at the given prices and updates peak/drawdown.
    pub fn mark_to_market(&mut self, prices: &BTreeMap<String, f64>) {
        let positions_value: f64 = self
            .positions
            .iter()
            .filter_map(|(symbol, lot)| prices.get(symbol).map(|price| lot.qty * price))
            .sum();

        self.nav = self.cash + positions_value;
        if self.nav > self.peak_nav {
            self.peak_nav = self.nav;
        }
        self.drawdown = if self.peak_nav > 0.0 {
            self.nav / self.peak_nav - 1.0
        } else {
            0.0
        };
    }

    /// Resets the peak to the current NAV (clears drawdown).
    pub fn reset_peak(&mut self) {
        self.peak_nav = self.nav;
        self.drawdown = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn prices(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(sym, p)| ((*sym).to_string(), *p))
            .collect()
    }

    #[test]
    fn test_new_state_is_all_cash() {
        let state = PortfolioState::new(100_000.0);
        assert_relative_eq!(state.nav, 100_000.0, epsilon = 1e-10);
        assert_relative_eq!(state.cash, 100_000.0, epsilon = 1e-10);
        assert!(state.positions.is_empty());
        assert_relative_eq!(state.drawdown, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mark_to_market_tracks_peak_and_drawdown() {
        let mut state = PortfolioState::new(100_000.0);
        state.cash = 0.0;
        state.positions.insert(
            "BTC".to_string(),
            PositionLot {
                qty: 10.0,
                avg_cost: 10_000.0,
            },
        );

        state.mark_to_market(&prices(&[("BTC", 11_000.0)]));
        assert_relative_eq!(state.nav, 110_000.0, epsilon = 1e-8);
        assert_relative_eq!(state.peak_nav, 110_000.0, epsilon = 1e-8);
        assert_relative_eq!(state.drawdown, 0.0, epsilon = 1e-12);

        state.mark_to_market(&prices(&[("BTC", 9_900.0)]));
        assert_relative_eq!(state.nav, 99_000.0, epsilon = 1e-8);
        // Peak never decreases
        assert_relative_eq!(state.peak_nav, 110_000.0, epsilon = 1e-8);
        assert_relative_eq!(state.drawdown, 99_000.0 / 110_000.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exposures_are_nav_relative() {
        let mut state = PortfolioState::new(100_000.0);
        state.cash = 50_000.0;
        state.positions.insert(
            "ETH".to_string(),
            PositionLot {
                qty: 25.0,
                avg_cost: 2_000.0,
            },
        );
        state.mark_to_market(&prices(&[("ETH", 2_000.0)]));

        let exposures = state.exposures(&prices(&[("ETH", 2_000.0)]));
        assert_relative_eq!(exposures["ETH"], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_reset_peak_clears_drawdown() {
        let mut state = PortfolioState::new(100.0);
        state.cash = 80.0;
        state.mark_to_market(&BTreeMap::new());
        assert!(state.drawdown < 0.0);

        state.reset_peak();
        assert_relative_eq!(state.drawdown, 0.0, epsilon = 1e-12);
        assert_relative_eq!(state.peak_nav, 80.0, epsilon = 1e-10);
    }
}
