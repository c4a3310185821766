//! Simulation engine orchestration.

use std::collections::BTreeMap;
use std::time::Instant;

use meridian_data::MarketStore;
use meridian_execution::ExecutionSimulator;
use meridian_portfolio::{reconcile, RiskGate, StrategyBooks};
use meridian_strategy::{Context, Strategy, StrategyRegistry};
use meridian_types::{
    EquityPoint, Order, PortfolioState, PriceReference, SimulationConfig, SimulationResult,
    StrategyOutput,
};
use serde_json::json;

use crate::date::{parse_datetime_ns, DateBoundary};
use crate::error::SimulationError;
use crate::event_loop;
use crate::provider::MarketContextProvider;
use crate::result_builder;

const DEADLINE_CHECK_INTERVAL: usize = 256;

/// One strategy slot wired into the engine.
struct StrategySlot {
    id: String,
    strategy: Box<dyn Strategy>,
}

/// Simulation engine orchestrating all components for one run.
pub struct SimulationEngine {
    config: SimulationConfig,
    data: MarketStore,
    slots: Vec<StrategySlot>,
    budgets: BTreeMap<String, f64>,
    books: StrategyBooks,
    gate: RiskGate,
    simulator: ExecutionSimulator,
    state: PortfolioState,
    orders: Vec<Order>,
    equity_curve: Vec<EquityPoint>,
    breach_count: u64,
    warmup_bars: usize,
    start_instant: Instant,
}

impl SimulationEngine {
    /// Creates a new simulation engine from config and the full market store.
    ///
    /// The store is sliced to the configured date range here; walk-forward
    /// windows reuse one loaded store with different ranges.
    ///
    /// # Errors
    /// Returns an error when the configuration is invalid, the date range is
    /// empty, or there is not enough data for warmup plus one decision bar.
    pub fn new(config: SimulationConfig, data: &MarketStore) -> Result<Self, SimulationError> {
        let start_ns = parse_datetime_ns(&config.start_date, DateBoundary::Start)?;
        let end_ns = parse_datetime_ns(&config.end_date, DateBoundary::End)?;
        if start_ns > end_ns {
            return Err(SimulationError::ConfigValidation(
                "start_date must be before end_date".to_string(),
            ));
        }

        let data = data.slice_by_time(start_ns, end_ns)?;

        let registry = StrategyRegistry::with_defaults();
        let mut slots = Vec::with_capacity(config.strategies.len());
        let mut budgets = BTreeMap::new();
        let mut strategy_warmup = 0usize;
        for slot_config in &config.strategies {
            let strategy = registry.create(&slot_config.name, &slot_config.parameters)?;
            strategy_warmup = strategy_warmup.max(strategy.warmup_bars());
            let id = slot_config.id().to_string();
            budgets.insert(id.clone(), slot_config.budget_fraction);
            slots.push(StrategySlot { id, strategy });
        }

        let warmup_bars = config.warmup_bars.max(strategy_warmup);
        // Warmup plus at least one decision bar and one fill bar.
        let required = warmup_bars + 2;
        if data.len() < required {
            return Err(SimulationError::InsufficientData {
                required,
                available: data.len(),
            });
        }

        let rng_seed = config.rng_seed.unwrap_or(42);
        let simulator =
            ExecutionSimulator::new(&config.costs, config.min_trade_fraction, rng_seed);
        let gate = RiskGate::new(config.risk.clone());
        let state = PortfolioState::new(config.initial_nav);
        let slot_ids: Vec<String> = slots.iter().map(|slot| slot.id.clone()).collect();

        Ok(Self {
            config,
            data,
            slots,
            budgets,
            books: StrategyBooks::new(&slot_ids),
            gate,
            simulator,
            state,
            orders: Vec::new(),
            equity_curve: Vec::new(),
            breach_count: 0,
            warmup_bars,
            start_instant: Instant::now(),
        })
    }

    /// Runs the simulation event loop and returns the result.
    ///
    /// # Errors
    /// Propagates contract violations, execution failures, and the
    /// evaluation wall-clock budget.
    pub fn run(mut self) -> Result<SimulationResult, SimulationError> {
        self.start_instant = Instant::now();
        event_loop::run_event_loop(&mut self)?;
        self.validate_portfolio_consistency()?;

        let runtime_seconds = self.start_instant.elapsed().as_secs_f64();
        let meta = result_builder::build_meta(
            &self.data.timestamps,
            self.warmup_bars,
            runtime_seconds,
            json!({ "risk_breaches": self.breach_count }),
        );

        Ok(result_builder::build_result(
            self.orders,
            self.equity_curve,
            meta,
        ))
    }

    pub(crate) fn warmup_bars(&self) -> usize {
        self.warmup_bars
    }

    /// Index of the last decision bar (exclusive upper bound).
    pub(crate) fn decision_end(&self) -> usize {
        match self.config.price_reference {
            // Fills need the next bar
            PriceReference::NextOpen => self.data.len() - 1,
            PriceReference::Close => self.data.len(),
        }
    }

    pub(crate) fn check_deadline(&self, idx: usize) -> Result<(), SimulationError> {
        let Some(budget) = self.config.max_eval_seconds else {
            return Ok(());
        };
        if idx % DEADLINE_CHECK_INTERVAL != 0 {
            return Ok(());
        }
        let elapsed = self.start_instant.elapsed().as_secs_f64();
        if elapsed > budget {
            return Err(SimulationError::EvalBudgetExceeded { elapsed, budget });
        }
        Ok(())
    }

    /// Processes one decision bar: snapshot, strategy outputs, reconcile,
    /// gate, fills, settlement, book drift.
    pub(crate) fn process_bar(&mut self, idx: usize) -> Result<(), SimulationError> {
        let now_ns = self.data.timestamps[idx];
        let provider = MarketContextProvider::new(self.config.context.clone(), &self.data);
        let snapshot = provider.snapshot_at(idx, now_ns)?;

        // 1. Collect every strategy's intent for this bar.
        let mut outputs: Vec<StrategyOutput> = Vec::with_capacity(self.slots.len());
        for slot in &mut self.slots {
            let ctx = Context {
                timestamp_ns: snapshot.timestamp_ns,
                features: snapshot.features.clone(),
                regime: snapshot.regime,
                budget_fraction: self.budgets.get(&slot.id).copied().unwrap_or(0.0),
                current_exposures: self.books.exposures(&slot.id),
            };

            let mut output = slot.strategy.evaluate(&ctx)?;
            output.strategy_id = slot.id.clone();
            // Fail fast: a malformed output aborts the run before any order
            // is built. Clamping would report a corrupted backtest as valid.
            output.validate()?;
            outputs.push(output);
        }

        // 2. Reconcile into one target book (budget and leverage applied
        //    exactly once, holds copied verbatim).
        let reconciliation = reconcile(
            &outputs,
            &self.books,
            &self.budgets,
            self.config.leverage_multiplier,
        )?;
        let mut target = reconciliation.target;

        // 3. Risk gate, with per-symbol clip factors captured so the
        //    per-strategy books scale proportionally.
        let pre_gate = target.exposures.clone();
        let breaches = self.gate.apply(&mut target, &self.state);
        self.breach_count += breaches.len() as u64;

        let mut scale_factors: BTreeMap<String, f64> = BTreeMap::new();
        for (symbol, before) in &pre_gate {
            if before.abs() > f64::EPSILON {
                let after = target.exposures.get(symbol).copied().unwrap_or(0.0);
                let factor = after / before;
                if (factor - 1.0).abs() > 1e-12 {
                    scale_factors.insert(symbol.clone(), factor);
                }
            }
        }

        // 4. Commit rebalanced books, then apply gate clips to all books.
        let rebalanced: std::collections::BTreeSet<String> =
            reconciliation.proposed_books.keys().cloned().collect();
        for (strategy_id, book) in reconciliation.proposed_books {
            self.books.commit(&strategy_id, book);
        }
        if !scale_factors.is_empty() {
            self.books.scale(&scale_factors);
        }

        // 5. Fills at the configured reference price, atomic settlement.
        let fill_idx = match self.config.price_reference {
            PriceReference::NextOpen => idx + 1,
            PriceReference::Close => idx,
        };
        let fill_prices = match self.config.price_reference {
            PriceReference::NextOpen => self.data.opens_at(fill_idx),
            PriceReference::Close => self.data.closes_at(fill_idx),
        };
        let mark_prices = self.data.closes_at(fill_idx);
        let fill_ts = self.data.timestamps[fill_idx];

        let nav_before = self.state.nav;
        let orders = self.simulator.step(
            &target,
            &fill_prices,
            &mark_prices,
            fill_ts,
            &mut self.state,
        )?;
        self.orders.extend(orders);

        self.equity_curve.push(EquityPoint {
            timestamp_ns: fill_ts,
            nav: self.state.nav,
            cash: self.state.cash,
            drawdown: self.state.drawdown,
            peak_nav: self.state.peak_nav,
        });

        // 6. Drift books to the settlement close. A held book drifts from
        //    the prior close; a freshly rebalanced one from its fill
        //    reference, since that is where its exposure was established.
        //    Price return over NAV ratio is the only mutation a held book
        //    ever sees.
        let decision_closes = self.data.closes_at(idx);
        let nav_ratio = if nav_before > 0.0 {
            self.state.nav / nav_before
        } else {
            1.0
        };
        for slot in &self.slots {
            let old_prices = if rebalanced.contains(&slot.id) {
                &fill_prices
            } else {
                &decision_closes
            };
            self.books
                .drift_strategy(&slot.id, old_prices, &mark_prices, nav_ratio);
        }

        Ok(())
    }

    fn validate_portfolio_consistency(&self) -> Result<(), SimulationError> {
        const CONSISTENCY_EPS: f64 = 1e-6;

        let last_idx = self.data.len() - 1;
        let closes = self.data.closes_at(last_idx);
        let positions_value: f64 = self
            .state
            .positions
            .iter()
            .filter_map(|(symbol, lot)| closes.get(symbol).map(|price| lot.qty * price))
            .sum();

        let reconstructed = self.state.cash + positions_value;
        if (reconstructed - self.state.nav).abs() > CONSISTENCY_EPS * self.state.nav.abs().max(1.0)
        {
            return Err(SimulationError::Runtime(format!(
                "portfolio inconsistency: nav {} != cash + positions {}",
                self.state.nav, reconstructed
            )));
        }
        Ok(())
    }
}
