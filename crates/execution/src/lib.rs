//! Meridian Execution
//!
//! Diffs reconciled targets against current holdings and settles fills at
//! the configured reference price. Held exposure is never diffed: only
//! symbols marked active by the reconciler or risk gate may generate
//! orders, which is what keeps the intended low-frequency rebalance cadence
//! instead of spurious micro-rebalances every bar.

#![deny(clippy::all)]

pub mod costs;
pub mod error;
pub mod fees;
pub mod simulator;
pub mod slippage;

pub use costs::{costs_from_yaml, load_costs, CostModels};
pub use error::ExecutionError;
pub use fees::{BpsCommission, CommissionModel, NoCommission};
pub use simulator::ExecutionSimulator;
pub use slippage::{FixedBpsSlippage, JitterBpsSlippage, NoSlippage, SlippageModel};
