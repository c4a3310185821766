//! Slippage models for fill simulation.
//!
//! Slippage is returned in price units, signed so it is always adverse:
//! positive for buys, negative for sells.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Trait for slippage calculation models.
///
/// Implementations must be deterministic when given the same RNG state.
pub trait SlippageModel: Send + Sync {
    /// Calculates slippage for a fill.
    ///
    /// # Arguments
    /// * `price` - The reference price
    /// * `is_buy` - Fill direction
    /// * `rng` - Deterministic random number generator
    ///
    /// # Returns
    /// Signed slippage in price units (adverse for the trader).
    fn calculate(&self, price: f64, is_buy: bool, rng: &mut ChaCha8Rng) -> f64;

    /// Returns the model name for logging/debugging.
    fn name(&self) -> &'static str;
}

/// Fixed slippage in basis points of the reference price.
#[derive(Debug, Clone)]
pub struct FixedBpsSlippage {
    /// Slippage in basis points
    pub bps: f64,
}

impl FixedBpsSlippage {
    /// Creates a new fixed slippage model.
    #[must_use]
    pub fn new(bps: f64) -> Self {
        Self { bps }
    }
}

impl SlippageModel for FixedBpsSlippage {
    fn calculate(&self, price: f64, is_buy: bool, _rng: &mut ChaCha8Rng) -> f64 {
        let base = price * self.bps / 10_000.0;
        if is_buy { base } else { -base }
    }

    fn name(&self) -> &'static str {
        "FixedBpsSlippage"
    }
}

/// Base slippage plus seeded uniform jitter, both in basis points.
#[derive(Debug, Clone)]
pub struct JitterBpsSlippage {
    /// Base slippage in basis points
    pub base_bps: f64,
    /// Jitter half-width in basis points
    pub jitter_bps: f64,
}

impl JitterBpsSlippage {
    /// Creates a new jittered slippage model.
    #[must_use]
    pub fn new(base_bps: f64, jitter_bps: f64) -> Self {
        Self {
            base_bps,
            jitter_bps: jitter_bps.max(0.0),
        }
    }
}

impl SlippageModel for JitterBpsSlippage {
    fn calculate(&self, price: f64, is_buy: bool, rng: &mut ChaCha8Rng) -> f64 {
        let jitter: f64 = if self.jitter_bps > 0.0 {
            rng.gen_range(-self.jitter_bps..self.jitter_bps)
        } else {
            0.0
        };
        // Jitter may improve a fill but never flips it favorable overall
        let bps = (self.base_bps + jitter).max(0.0);
        let base = price * bps / 10_000.0;
        if is_buy { base } else { -base }
    }

    fn name(&self) -> &'static str {
        "JitterBpsSlippage"
    }
}

/// Zero slippage model for testing or ideal conditions.
#[derive(Debug, Clone, Default)]
pub struct NoSlippage;

impl SlippageModel for NoSlippage {
    fn calculate(&self, _price: f64, _is_buy: bool, _rng: &mut ChaCha8Rng) -> f64 {
        0.0
    }

    fn name(&self) -> &'static str {
        "NoSlippage"
    }
}
