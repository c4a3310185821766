//! Meridian Campaign
//!
//! Ties the pieces together: maps searched parameter sets onto a base
//! simulation config by dot-path, wraps the simulation in a guarded
//! objective (sentinel scoring, bounded evaluation), and drives search and
//! walk-forward validation campaigns over shared read-only market data.

#![deny(clippy::all)]

pub mod campaign;
pub mod error;
pub mod objective;
pub mod overrides;

pub use campaign::{
    run_search_campaign, run_walk_forward, CampaignConfig, CampaignResult, WalkForwardCampaign,
};
pub use error::CampaignError;
pub use objective::build_objective;
pub use overrides::apply_overrides;
