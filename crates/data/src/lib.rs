//! Meridian Data
//!
//! Loads historical bar data from Parquet, aligns it across the traded
//! universe, and validates it before a simulation may consume it.

#![deny(clippy::all)]

pub mod error;
pub mod loader;
pub mod store;
pub mod validation;

pub use error::DataError;
pub use loader::{load_bars, load_universe, resolve_data_path};
pub use store::{BarStore, MarketStore};
pub use validation::{align_universe, filter_by_date_range, validate_bars};
