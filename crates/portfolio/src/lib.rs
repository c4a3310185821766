//! Meridian Portfolio
//!
//! Converts independent per-strategy intent vectors into a single leveraged
//! position book. The reconciler applies budget fractions and the global
//! leverage multiplier exactly once per rebalance decision; the risk gate
//! clips the reconciled book to hard limits with proportional scaling and a
//! drawdown circuit breaker.

#![deny(clippy::all)]

pub mod books;
pub mod error;
pub mod reconciler;
pub mod risk_gate;

pub use books::StrategyBooks;
pub use error::PortfolioError;
pub use reconciler::{reconcile, Reconciliation};
pub use risk_gate::{BreachKind, RiskGate, RiskLimitBreach};
