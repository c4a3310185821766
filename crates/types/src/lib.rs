//! Meridian Types
//!
//! Core data structures for the Meridian backtest engine.
//! This crate provides types for bars, strategy outputs, reconciled targets,
//! portfolio state, orders, parameter sets, fitness records, configuration,
//! and simulation results.

#![deny(clippy::all)]

pub mod bar;
pub mod config;
pub mod error;
pub mod fitness;
pub mod order;
pub mod output;
pub mod param;
pub mod result;
pub mod state;
pub mod target;

// Re-export main types for convenience
pub use bar::Bar;
pub use config::{
    CostsConfig, DrawdownConfig, PriceReference, RiskLimitsConfig, RunMode, SimulationConfig,
    StrategySlotConfig,
};
pub use error::CoreError;
pub use fitness::FitnessRecord;
pub use order::Order;
pub use output::StrategyOutput;
pub use param::ParameterSet;
pub use result::{EquityPoint, ErrorResult, ResultMeta, SimulationResult};
pub use state::{PortfolioState, PositionLot};
pub use target::ReconciledTarget;
