//! Built-in strategy implementations.

pub mod buy_and_hold;
pub mod momentum;
pub mod regime_follow;
