//! Strategy registry for dynamic strategy creation
//!
//! Allows strategies to be registered and created by name at runtime:
//! a closed, versioned interface instead of runtime attribute probing.

use crate::error::StrategyError;
use crate::traits::Strategy;
use std::collections::HashMap;
use std::sync::Arc;

/// Factory function type for creating strategies from JSON params.
pub type StrategyFactory =
    Box<dyn Fn(&serde_json::Value) -> Result<Box<dyn Strategy>, StrategyError> + Send + Sync>;

/// Registry for strategy factories.
///
/// # Example
/// ```ignore
/// let mut registry = StrategyRegistry::new();
/// registry.register("momentum", |params| {
///     let strategy = MomentumRanking::from_params(params)?;
///     Ok(Box::new(strategy))
/// });
///
/// let strategy = registry.create("momentum", &params)?;
/// ```
pub struct StrategyRegistry {
    factories: HashMap<String, Arc<StrategyFactory>>,
}

impl StrategyRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry with default strategies pre-registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }

    /// Registers a strategy factory.
    ///
    /// # Arguments
    /// * `name` - Strategy name (case-insensitive)
    /// * `factory` - Factory function that creates the strategy
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&serde_json::Value) -> Result<Box<dyn Strategy>, StrategyError>
            + Send
            + Sync
            + 'static,
    {
        self.factories
            .insert(name.into().to_lowercase(), Arc::new(Box::new(factory)));
    }

    /// Creates a strategy by name.
    ///
    /// # Errors
    /// Returns `StrategyError::UnknownStrategy` if the name is not registered.
    pub fn create(
        &self,
        name: &str,
        params: &serde_json::Value,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        let factory = self
            .factories
            .get(&name.to_lowercase())
            .ok_or_else(|| StrategyError::UnknownStrategy(name.to_string()))?;

        factory(params)
    }

    /// Checks if a strategy is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// Returns all registered strategy names.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.factories.keys()
    }

    /// Returns the number of registered strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Checks if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registers default strategies.
    fn register_defaults(&mut self) {
        use crate::impl_::buy_and_hold::BuyAndHold;
        use crate::impl_::momentum::MomentumRanking;
        use crate::impl_::regime_follow::RegimeFollow;

        self.register("momentum", |params| {
            let strategy = MomentumRanking::from_params(params)?;
            Ok(Box::new(strategy))
        });
        self.register("regime_follow", |params| {
            let strategy = RegimeFollow::from_params(params)?;
            Ok(Box::new(strategy))
        });
        self.register("buy_and_hold", |params| {
            let strategy = BuyAndHold::from_params(params)?;
            Ok(Box::new(strategy))
        });
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
