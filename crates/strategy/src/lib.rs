//! Meridian Strategy
//!
//! The `Strategy` trait (`Context -> StrategyOutput`), the per-bar context
//! snapshot, a name-keyed registry, and the built-in models.
//!
//! Signal logic is deliberately simple and pluggable; the hard guarantees
//! (budget/leverage application, hold semantics, risk limits) live
//! downstream in the reconciler and execution simulator.

#![deny(clippy::all)]

pub mod context;
pub mod error;
pub mod impl_;
pub mod registry;
pub mod traits;

pub use context::{AssetFeatures, Context, Regime};
pub use error::StrategyError;
pub use registry::StrategyRegistry;
pub use traits::Strategy;
