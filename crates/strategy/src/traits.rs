//! Strategy trait
//!
//! Defines the core Strategy trait: one `Context` in, one `StrategyOutput`
//! out, once per bar.

use crate::context::Context;
use crate::error::StrategyError;
use meridian_types::StrategyOutput;

/// Trait for trading strategies.
///
/// A strategy is evaluated once per bar with a causality-guarded context
/// snapshot and returns an intent vector. Any internal state (e.g. the last
/// rebalance bar) is strategy-owned and not part of the engine contract.
///
/// # Thread Safety
/// Strategies must be `Send + Sync` so parameter-search workers can run
/// simulations in parallel.
///
/// # Example
/// ```ignore
/// impl Strategy for MyStrategy {
///     fn evaluate(&mut self, ctx: &Context) -> Result<StrategyOutput, StrategyError> {
///         if self.should_rebalance(ctx) {
///             Ok(StrategyOutput::rebalance(&self.id, ctx.timestamp_ns, self.pick_weights(ctx)))
///         } else {
///             Ok(StrategyOutput::hold(&self.id, ctx.timestamp_ns, ctx.current_exposures.clone()))
///         }
///     }
///
///     fn name(&self) -> &str { "my_strategy" }
/// }
/// ```
pub trait Strategy: Send + Sync {
    /// Evaluates one bar and returns the intent vector.
    ///
    /// # Errors
    /// Returns [`StrategyError`] when the strategy cannot produce a valid
    /// output; the enclosing simulation treats this as infeasible.
    fn evaluate(&mut self, ctx: &Context) -> Result<StrategyOutput, StrategyError>;

    /// Name of the strategy for registry lookup.
    fn name(&self) -> &str;

    /// Bars of history the strategy needs before it starts deciding.
    fn warmup_bars(&self) -> usize {
        0
    }

    /// Resets the strategy state for a new simulation run.
    fn reset(&mut self) {}
}
