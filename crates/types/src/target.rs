//! Reconciled portfolio target.

use std::collections::{BTreeMap, BTreeSet};

/// The single NAV-relative target book produced by reconciling all strategy
/// outputs for one bar.
///
/// `active` is the set of symbols touched by at least one non-holding
/// strategy (or force-rebalanced by the risk gate). The execution simulator
/// only diffs active symbols; held exposure is never re-diffed against
/// freshly recalculated prices.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ReconciledTarget {
    /// Per-symbol NAV-relative exposure (signed; negative = short)
    pub exposures: BTreeMap<String, f64>,
    /// Symbols eligible for order generation this bar
    pub active: BTreeSet<String>,
}

impl ReconciledTarget {
    /// Total gross exposure: `sum(|nav_fraction|)` across symbols.
    #[must_use]
    pub fn gross_exposure(&self) -> f64 {
        self.exposures.values().map(|e| e.abs()).sum()
    }

    /// Scales every exposure by `factor` and marks all symbols active.
    ///
    /// Used by the risk gate; a book that was scaled down must actually be
    /// traded down, held or not.
    pub fn scale_all(&mut self, factor: f64) {
        for exposure in self.exposures.values_mut() {
            *exposure *= factor;
        }
        self.active = self.exposures.keys().cloned().collect();
    }

    /// Scales a single symbol's exposure and marks it active.
    pub fn scale_symbol(&mut self, symbol: &str, factor: f64) {
        if let Some(exposure) = self.exposures.get_mut(symbol) {
            *exposure *= factor;
            self.active.insert(symbol.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn target(pairs: &[(&str, f64)]) -> ReconciledTarget {
        ReconciledTarget {
            exposures: pairs
                .iter()
                .map(|(sym, e)| ((*sym).to_string(), *e))
                .collect(),
            active: BTreeSet::new(),
        }
    }

    #[test]
    fn test_gross_exposure_nets_absolute_values() {
        let t = target(&[("BTC", 0.8), ("ETH", -0.4)]);
        assert_relative_eq!(t.gross_exposure(), 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_all_marks_active() {
        let mut t = target(&[("BTC", 1.0), ("ETH", 0.5)]);
        t.scale_all(0.5);

        assert_relative_eq!(t.exposures["BTC"], 0.5, epsilon = 1e-12);
        assert_relative_eq!(t.exposures["ETH"], 0.25, epsilon = 1e-12);
        assert!(t.active.contains("BTC"));
        assert!(t.active.contains("ETH"));
    }

    #[test]
    fn test_scale_symbol_only_touches_one() {
        let mut t = target(&[("BTC", 1.0), ("ETH", 0.5)]);
        t.scale_symbol("BTC", 0.5);

        assert_relative_eq!(t.exposures["BTC"], 0.5, epsilon = 1e-12);
        assert_relative_eq!(t.exposures["ETH"], 0.5, epsilon = 1e-12);
        assert!(t.active.contains("BTC"));
        assert!(!t.active.contains("ETH"));
    }
}
