//! Meridian Search
//!
//! Searches parameter space for configurations worth validating. Three
//! interchangeable methods (exhaustive grid, random sampling, and an
//! evolutionary loop) behind one entry point, evaluated on a rayon worker
//! pool over a caller-supplied objective. Deterministic given a fixed seed.

#![deny(clippy::all)]

pub mod cancel;
pub mod engine;
pub mod error;
pub mod evolutionary;
pub mod grid;
pub mod random;
pub mod space;

pub use cancel::CancellationToken;
pub use engine::{run_search, EvolutionConfig, Objective, SearchMethod};
pub use error::SearchError;
pub use space::{ParamBounds, ParamSpace, ParamSpec};
