//! Meridian Metrics
//!
//! Reduces a completed backtest's equity curve and order log into the
//! scalar metrics the search layer optimizes over.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// Fitness computation entrypoints.
pub mod compute;
/// Equity-curve metric helpers.
pub mod equity_metrics;
/// Composite score weighting.
pub mod score;
/// Order-log metric helpers.
pub mod trade_metrics;

pub use compute::compute_fitness;
pub use score::ScoreWeights;
