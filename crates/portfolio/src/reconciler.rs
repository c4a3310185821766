//! Portfolio reconciliation.
//!
//! Folds every strategy's intent vector into one NAV-relative target book.
//! Budget fraction and the global leverage multiplier are applied here and
//! only here, at the moment a strategy transitions out of `hold_current`.
//! A holding strategy's carried-forward exposure is copied verbatim, never
//! re-multiplied. Re-applying leverage to a held book would compound it
//! every bar purely from price drift; this module exists to make that
//! structurally impossible.

use std::collections::{BTreeMap, BTreeSet};

use meridian_types::{ReconciledTarget, StrategyOutput};

use crate::books::StrategyBooks;
use crate::error::PortfolioError;

/// Result of reconciling one bar's outputs.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// The summed target book plus the active-symbol set.
    pub target: ReconciledTarget,
    /// Replacement books for strategies that rebalanced this bar.
    pub proposed_books: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Reconciles all strategy outputs for one bar. Pure: no side effects
/// beyond the returned value.
///
/// # Errors
/// - [`PortfolioError::MissingBudget`] when an output has no budget entry.
/// - [`PortfolioError::DuplicateOutput`] when a strategy reports twice.
pub fn reconcile(
    outputs: &[StrategyOutput],
    books: &StrategyBooks,
    budgets: &BTreeMap<String, f64>,
    leverage_multiplier: f64,
) -> Result<Reconciliation, PortfolioError> {
    let mut exposures: BTreeMap<String, f64> = BTreeMap::new();
    let mut active: BTreeSet<String> = BTreeSet::new();
    let mut proposed_books: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();

    for output in outputs {
        if !seen.insert(&output.strategy_id) {
            return Err(PortfolioError::DuplicateOutput(output.strategy_id.clone()));
        }

        if output.hold_current {
            // Carried exposure, verbatim: no budget fraction, no leverage.
            for (symbol, fraction) in &output.weights {
                *exposures.entry(symbol.clone()).or_insert(0.0) += fraction;
            }
            continue;
        }

        let budget = budgets
            .get(&output.strategy_id)
            .copied()
            .ok_or_else(|| PortfolioError::MissingBudget(output.strategy_id.clone()))?;

        let mut new_book: BTreeMap<String, f64> = BTreeMap::new();
        for (symbol, weight) in &output.weights {
            let contribution = weight * budget * leverage_multiplier;
            *exposures.entry(symbol.clone()).or_insert(0.0) += contribution;
            new_book.insert(symbol.clone(), contribution);
            active.insert(symbol.clone());
        }

        // Symbols the strategy carried before but no longer wants must be
        // traded off, so they are active even with zero contribution.
        for symbol in books.exposures(&output.strategy_id).keys() {
            if !new_book.contains_key(symbol) {
                active.insert(symbol.clone());
                exposures.entry(symbol.clone()).or_insert(0.0);
            }
        }

        proposed_books.insert(output.strategy_id.clone(), new_book);
    }

    Ok(Reconciliation {
        target: ReconciledTarget { exposures, active },
        proposed_books,
    })
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

    fn budgets(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        map(pairs)
    }

    #[test]
    fn test_budget_and_leverage_applied_once() {
        // Three strategies, budgets {a: 0.5, b: 0.3, c: 0.2}, leverage 1.25,
        // each fully invested in one symbol: reconciled target is exactly
        // (0.5 + 0.3 + 0.2) * 1.25 = 1.25.
        let outputs = vec![
            StrategyOutput::rebalance("a", 0, map(&[("SYM", 1.0)])),
            StrategyOutput::rebalance("b", 0, map(&[("SYM", 1.0)])),
            StrategyOutput::rebalance("c", 0, map(&[("SYM", 1.0)])),
        ];
        let books = StrategyBooks::new(&["a".to_string(), "b".to_string(), "c".to_string()]);

        let result = reconcile(
            &outputs,
            &books,
            &budgets(&[("a", 0.5), ("b", 0.3), ("c", 0.2)]),
            1.25,
        )
        .unwrap();

        assert_relative_eq!(result.target.exposures["SYM"], 1.25, epsilon = 1e-12);
        assert!(result.target.active.contains("SYM"));
    }

    #[test]
    fn test_held_exposure_copied_verbatim() {
        // A leveraged book carried forward must come through untouched.
        let outputs = vec![StrategyOutput::hold("a", 0, map(&[("BTC", 1.25)]))];
        let books = StrategyBooks::new(&["a".to_string()]);

        let result = reconcile(&outputs, &books, &budgets(&[("a", 0.5)]), 2.0).unwrap();

        assert_relative_eq!(result.target.exposures["BTC"], 1.25, epsilon = 1e-12);
        // Holding produces no active symbols and no book replacement.
        assert!(result.target.active.is_empty());
        assert!(result.proposed_books.is_empty());
    }

    #[test]
    fn test_hold_and_active_net_per_symbol() {
        let mut books = StrategyBooks::new(&["holder".to_string(), "active".to_string()]);
        books.commit("holder", map(&[("BTC", 0.4)]));

        let outputs = vec![
            StrategyOutput::hold("holder", 0, map(&[("BTC", 0.4)])),
            StrategyOutput::rebalance("active", 0, map(&[("BTC", 1.0)])),
        ];

        let result = reconcile(
            &outputs,
            &books,
            &budgets(&[("holder", 0.5), ("active", 0.5)]),
            1.0,
        )
        .unwrap();

        // 0.4 held + 1.0 * 0.5 active
        assert_relative_eq!(result.target.exposures["BTC"], 0.9, epsilon = 1e-12);
        assert!(result.target.active.contains("BTC"));
    }

    #[test]
    fn test_abandoned_symbol_becomes_active_with_zero_target() {
        let mut books = StrategyBooks::new(&["a".to_string()]);
        books.commit("a", map(&[("BTC", 0.5)]));

        // Strategy rotates out of BTC entirely.
        let outputs = vec![StrategyOutput::rebalance("a", 0, map(&[("ETH", 1.0)]))];

        let result = reconcile(&outputs, &books, &budgets(&[("a", 1.0)]), 1.0).unwrap();

        assert!(result.target.active.contains("BTC"));
        assert_relative_eq!(result.target.exposures["BTC"], 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.target.exposures["ETH"], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_budget_errors() {
        let outputs = vec![StrategyOutput::rebalance("ghost", 0, map(&[("BTC", 1.0)]))];
        let books = StrategyBooks::default();

        let result = reconcile(&outputs, &books, &budgets(&[]), 1.0);
        assert!(matches!(result, Err(PortfolioError::MissingBudget(_))));
    }

    #[test]
    fn test_duplicate_output_errors() {
        let outputs = vec![
            StrategyOutput::rebalance("a", 0, map(&[("BTC", 0.5)])),
            StrategyOutput::rebalance("a", 0, map(&[("BTC", 0.5)])),
        ];
        let books = StrategyBooks::default();

        let result = reconcile(&outputs, &books, &budgets(&[("a", 1.0)]), 1.0);
        assert!(matches!(result, Err(PortfolioError::DuplicateOutput(_))));
    }

    #[test]
    fn test_hold_budget_not_required() {
        // A holding strategy never consults the budget table.
        let outputs = vec![StrategyOutput::hold("ghost", 0, map(&[("BTC", 0.3)]))];
        let books = StrategyBooks::default();

        let result = reconcile(&outputs, &books, &budgets(&[]), 1.0).unwrap();
        assert_relative_eq!(result.target.exposures["BTC"], 0.3, epsilon = 1e-12);
    }
}
