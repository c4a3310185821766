//! Meridian Walk-Forward
//!
//! Validates searched parameter sets on held-out windows before they are
//! trusted. A candidate trains on one window, re-runs on every validation
//! window, and is accepted only when out-of-sample fitness clears a floor
//! and stays within a degradation ceiling of the training score.

#![deny(clippy::all)]

pub mod error;
pub mod validator;
pub mod window;

pub use error::WalkForwardError;
pub use validator::{
    RejectReason, ValidationCriteria, ValidationResult, Verdict, WalkForwardReport,
    WalkForwardValidator,
};
pub use window::{WalkForwardPlan, WindowSpec};
