//! Cost model resolution from configuration.
//!
//! Costs come either from the inline [`CostsConfig`] section of a
//! simulation config or from a standalone YAML file shared with other
//! tooling.

use std::path::Path;

use meridian_types::CostsConfig;

use crate::error::ExecutionError;
use crate::fees::{BpsCommission, CommissionModel, NoCommission};
use crate::slippage::{FixedBpsSlippage, JitterBpsSlippage, NoSlippage, SlippageModel};

/// Resolved cost models for one simulation.
pub struct CostModels {
    /// Slippage model
    pub slippage: Box<dyn SlippageModel>,
    /// Commission model
    pub commission: Box<dyn CommissionModel>,
}

impl CostModels {
    /// Resolves concrete models from a costs config.
    ///
    /// Disabled costs resolve to no-op models; jitter selects the seeded
    /// jitter model over the fixed one.
    #[must_use]
    pub fn from_config(config: &CostsConfig) -> Self {
        if !config.enabled {
            return Self::zero_cost();
        }

        let slippage: Box<dyn SlippageModel> = if config.slippage_jitter_bps > 0.0 {
            Box::new(JitterBpsSlippage::new(
                config.slippage_bps,
                config.slippage_jitter_bps,
            ))
        } else if config.slippage_bps > 0.0 {
            Box::new(FixedBpsSlippage::new(config.slippage_bps))
        } else {
            Box::new(NoSlippage)
        };

        let commission: Box<dyn CommissionModel> = if config.commission_bps > 0.0
            || config.commission_min > 0.0
        {
            Box::new(BpsCommission::new(
                config.commission_bps,
                config.commission_min,
            ))
        } else {
            Box::new(NoCommission)
        };

        Self {
            slippage,
            commission,
        }
    }

    /// No fees, no slippage (for testing).
    #[must_use]
    pub fn zero_cost() -> Self {
        Self {
            slippage: Box::new(NoSlippage),
            commission: Box::new(NoCommission),
        }
    }
}

/// Loads a costs config from a YAML file.
///
/// # Errors
/// Returns [`ExecutionError`] on IO or parse failure.
pub fn load_costs(path: &Path) -> Result<CostsConfig, ExecutionError> {
    let content = std::fs::read_to_string(path)?;
    costs_from_yaml(&content)
}

/// Parses a costs config from a YAML string.
///
/// # Errors
/// Returns [`ExecutionError::Yaml`] on parse failure.
pub fn costs_from_yaml(yaml: &str) -> Result<CostsConfig, ExecutionError> {
    let config: CostsConfig = serde_yaml::from_str(yaml)?;
    Ok(config)
}
