//! Per-strategy NAV-relative exposure books.
//!
//! Each strategy's share of the aggregate position book is tracked as a map
//! of NAV fractions. Books are what make the hold contract enforceable: a
//! holding strategy's carried-forward exposure is whatever its book drifted
//! to, and the reconciler copies it through without any multiplier.

use std::collections::BTreeMap;

/// NAV-relative books, one per strategy slot.
#[derive(Debug, Clone, Default)]
pub struct StrategyBooks {
    books: BTreeMap<String, BTreeMap<String, f64>>,
}

impl StrategyBooks {
    /// Creates empty books for the given strategy ids.
    #[must_use]
    pub fn new(strategy_ids: &[String]) -> Self {
        Self {
            books: strategy_ids
                .iter()
                .map(|id| (id.clone(), BTreeMap::new()))
                .collect(),
        }
    }

    /// A strategy's current book (empty when unknown).
    #[must_use]
    pub fn exposures(&self, strategy_id: &str) -> BTreeMap<String, f64> {
        self.books.get(strategy_id).cloned().unwrap_or_default()
    }

    /// Replaces a strategy's book after a rebalance decision.
    pub fn commit(&mut self, strategy_id: &str, book: BTreeMap<String, f64>) {
        self.books.insert(strategy_id.to_string(), book);
    }

    /// Aggregate exposure per symbol across all strategies.
    #[must_use]
    pub fn aggregate(&self) -> BTreeMap<String, f64> {
        let mut out: BTreeMap<String, f64> = BTreeMap::new();
        for book in self.books.values() {
            for (symbol, fraction) in book {
                *out.entry(symbol.clone()).or_insert(0.0) += fraction;
            }
        }
        out
    }

    /// Applies per-symbol scale factors (risk-gate clips) to every book,
    /// preserving relative strategy weighting.
    pub fn scale(&mut self, factors: &BTreeMap<String, f64>) {
        for book in self.books.values_mut() {
            for (symbol, fraction) in book.iter_mut() {
                if let Some(factor) = factors.get(symbol) {
                    *fraction *= factor;
                }
            }
        }
    }

    /// Drifts one strategy's book by realized price return and NAV ratio:
    /// `frac' = frac * (price_new / price_old) / (nav_new / nav_old)`.
    ///
    /// `old_prices` is where the book's exposure was last established: the
    /// prior settlement close for a holding strategy, the fill reference
    /// price for one that just rebalanced. This is the only way a book may
    /// change between rebalances; leverage is never part of the drift.
    pub fn drift_strategy(
        &mut self,
        strategy_id: &str,
        old_prices: &BTreeMap<String, f64>,
        new_prices: &BTreeMap<String, f64>,
        nav_ratio: f64,
    ) {
        if nav_ratio <= 0.0 {
            return;
        }
        let Some(book) = self.books.get_mut(strategy_id) else {
            return;
        };
        for (symbol, fraction) in book.iter_mut() {
            if let (Some(old), Some(new)) = (old_prices.get(symbol), new_prices.get(symbol)) {
                if *old > 0.0 {
                    *fraction *= (new / old) / nav_ratio;
                }
            }
        }
        book.retain(|_, fraction| fraction.abs() > f64::EPSILON);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn map(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), *v))
            .collect()
    }

    #[test]
    fn test_aggregate_sums_across_strategies() {
        let mut books = StrategyBooks::new(&["a".to_string(), "b".to_string()]);
        books.commit("a", map(&[("BTC", 0.5)]));
        books.commit("b", map(&[("BTC", 0.3), ("ETH", 0.2)]));

        let agg = books.aggregate();
        assert_relative_eq!(agg["BTC"], 0.8, epsilon = 1e-12);
        assert_relative_eq!(agg["ETH"], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_preserves_relative_weighting() {
        let mut books = StrategyBooks::new(&["a".to_string(), "b".to_string()]);
        books.commit("a", map(&[("BTC", 0.6)]));
        books.commit("b", map(&[("BTC", 0.2)]));

        books.scale(&map(&[("BTC", 0.5)]));

        let a = books.exposures("a");
        let b = books.exposures("b");
        assert_relative_eq!(a["BTC"], 0.3, epsilon = 1e-12);
        assert_relative_eq!(b["BTC"], 0.1, epsilon = 1e-12);
        // 3:1 ratio unchanged
        assert_relative_eq!(a["BTC"] / b["BTC"], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_drift_applies_price_return_over_nav_ratio() {
        let mut books = StrategyBooks::new(&["a".to_string()]);
        books.commit("a", map(&[("BTC", 0.5)]));

        // Price +10%, NAV +5% -> fraction grows by 1.10 / 1.05
        books.drift_strategy(
            "a",
            &map(&[("BTC", 100.0)]),
            &map(&[("BTC", 110.0)]),
            1.05,
        );

        let book = books.exposures("a");
        assert_relative_eq!(book["BTC"], 0.5 * 1.10 / 1.05, epsilon = 1e-12);
    }

    #[test]
    fn test_drift_touches_only_named_strategy() {
        let mut books = StrategyBooks::new(&["a".to_string(), "b".to_string()]);
        books.commit("a", map(&[("BTC", 0.5)]));
        books.commit("b", map(&[("BTC", 0.5)]));

        books.drift_strategy(
            "a",
            &map(&[("BTC", 100.0)]),
            &map(&[("BTC", 120.0)]),
            1.0,
        );

        assert_relative_eq!(books.exposures("a")["BTC"], 0.6, epsilon = 1e-12);
        assert_relative_eq!(books.exposures("b")["BTC"], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_drift_never_multiplies_flat_book() {
        let mut books = StrategyBooks::new(&["a".to_string()]);
        books.drift_strategy(
            "a",
            &map(&[("BTC", 100.0)]),
            &map(&[("BTC", 200.0)]),
            1.0,
        );
        assert!(books.exposures("a").is_empty());
    }
}
