//! The bar-level execution simulator.
//!
//! One `step` per bar: diff the gated target against current holdings for
//! active symbols, fill at the reference price plus costs, then settle the
//! whole state atomically.

use std::collections::{BTreeMap, BTreeSet};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use meridian_types::{CostsConfig, Order, PortfolioState, PositionLot, ReconciledTarget};

use crate::costs::CostModels;
use crate::error::ExecutionError;

/// Quantities below this are dust and drop out of the position book.
const QTY_EPS: f64 = 1e-10;

/// Stateful execution simulator for one simulation run.
///
/// State is the cost models and the deterministic slippage RNG; portfolio
/// state is owned by the caller and mutated only inside [`Self::step`].
pub struct ExecutionSimulator {
    costs: CostModels,
    min_trade_fraction: f64,
    rng: ChaCha8Rng,
}

impl ExecutionSimulator {
    /// Creates a simulator from a costs config and seed.
    #[must_use]
    pub fn new(costs: &CostsConfig, min_trade_fraction: f64, rng_seed: u64) -> Self {
        Self {
            costs: CostModels::from_config(costs),
            min_trade_fraction: min_trade_fraction.max(0.0),
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Executes one bar: generates fills for active symbols and settles the
    /// portfolio state.
    ///
    /// * `target` - gated target book with its active-symbol set
    /// * `fill_prices` - reference prices for fills (next-bar open)
    /// * `mark_prices` - prices used to re-mark NAV after fills (fill-bar close)
    /// * `timestamp_ns` - fill bar timestamp for the order log
    ///
    /// Symbols outside the active set are skipped outright: held exposure is
    /// never diffed against a freshly recalculated price, so a bar where
    /// every strategy holds produces zero orders.
    ///
    /// # Errors
    /// - [`ExecutionError::MissingPrice`] when an active symbol has no fill price.
    /// - [`ExecutionError::Numeric`] when a non-finite value reaches the simulator.
    pub fn step(
        &mut self,
        target: &ReconciledTarget,
        fill_prices: &BTreeMap<String, f64>,
        mark_prices: &BTreeMap<String, f64>,
        timestamp_ns: i64,
        state: &mut PortfolioState,
    ) -> Result<Vec<Order>, ExecutionError> {
        let nav = state.nav;
        if !nav.is_finite() || nav <= 0.0 {
            return Err(ExecutionError::Numeric(format!("non-positive NAV {nav}")));
        }

        let mut symbols: BTreeSet<String> = target.exposures.keys().cloned().collect();
        symbols.extend(state.positions.keys().cloned());

        let mut orders = Vec::new();
        for symbol in symbols {
            if !target.active.contains(&symbol) {
                continue;
            }

            let target_frac = target.exposures.get(&symbol).copied().unwrap_or(0.0);
            if !target_frac.is_finite() {
                return Err(ExecutionError::Numeric(format!(
                    "non-finite target for {symbol}"
                )));
            }

            let reference_price = fill_prices
                .get(&symbol)
                .copied()
                .ok_or_else(|| ExecutionError::MissingPrice(symbol.clone()))?;
            if !reference_price.is_finite() || reference_price <= 0.0 {
                return Err(ExecutionError::Numeric(format!(
                    "invalid fill price {reference_price} for {symbol}"
                )));
            }

            let current_qty = state.positions.get(&symbol).map_or(0.0, |lot| lot.qty);
            let delta_value = target_frac * nav - current_qty * reference_price;
            if delta_value.abs() < self.min_trade_fraction * nav {
                continue;
            }

            let is_buy = delta_value > 0.0;
            let slippage = self
                .costs
                .slippage
                .calculate(reference_price, is_buy, &mut self.rng);
            let fill_price = reference_price + slippage;
            if fill_price <= 0.0 {
                return Err(ExecutionError::Numeric(format!(
                    "slippage produced non-positive fill for {symbol}"
                )));
            }

            let delta_qty = delta_value / fill_price;
            let commission = self.costs.commission.calculate(delta_qty * fill_price);

            let realized_pnl = apply_fill(state, &symbol, delta_qty, fill_price);
            state.cash -= delta_qty * fill_price + commission;

            orders.push(Order {
                timestamp_ns,
                symbol,
                delta_qty,
                reference_price,
                fill_price,
                commission,
                slippage,
                realized_pnl,
            });
        }

        // Atomic settlement: NAV, peak and drawdown update once, after all
        // symbols are processed.
        state.mark_to_market(mark_prices);

        Ok(orders)
    }
}

/// Applies one fill to the position book and returns realized PnL for the
/// reducing part (0 for pure adds).
fn apply_fill(state: &mut PortfolioState, symbol: &str, delta_qty: f64, fill_price: f64) -> f64 {
    let lot = state.positions.get(symbol).copied().unwrap_or(PositionLot {
        qty: 0.0,
        avg_cost: fill_price,
    });

    let mut realized = 0.0;
    let new_qty = lot.qty + delta_qty;

    let new_lot = if lot.qty == 0.0 || lot.qty.signum() == delta_qty.signum() {
        // Opening or adding: average the cost in
        let avg_cost = if new_qty.abs() > QTY_EPS {
            (lot.qty * lot.avg_cost + delta_qty * fill_price) / new_qty
        } else {
            fill_price
        };
        PositionLot { qty: new_qty, avg_cost }
    } else if new_qty.abs() <= QTY_EPS || new_qty.signum() == lot.qty.signum() {
        // Reducing (possibly to flat): realize against average cost
        let closed_qty = delta_qty.abs().min(lot.qty.abs());
        realized = (fill_price - lot.avg_cost) * closed_qty * lot.qty.signum();
        PositionLot {
            qty: new_qty,
            avg_cost: lot.avg_cost,
        }
    } else {
        // Flip: close the whole old lot, open the residual at the fill
        realized = (fill_price - lot.avg_cost) * lot.qty.abs() * lot.qty.signum();
        PositionLot {
            qty: new_qty,
            avg_cost: fill_price,
        }
    };

    if new_lot.qty.abs() <= QTY_EPS {
        state.positions.remove(symbol);
    } else {
        state.positions.insert(symbol.to_string(), new_lot);
    }

    realized
}
