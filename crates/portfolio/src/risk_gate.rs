//! Risk gate: hard exposure limits and drawdown-triggered de-risking.
//!
//! Checks run in a fixed, documented order (per-asset cap, per-asset-class
//! cap, gross leverage cap, drawdown circuit breaker), each as a
//! proportional scale-down so relative strategy weighting survives. The
//! gate never errors: it always returns a feasible target, reporting what
//! it clipped as `RiskLimitBreach` events.

use std::collections::BTreeMap;

use meridian_types::{PortfolioState, ReconciledTarget, RiskLimitsConfig};
use serde::{Deserialize, Serialize};

/// Which limit a breach hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreachKind {
    /// Single-symbol exposure cap
    PerAsset,
    /// Asset-class gross cap
    AssetClass,
    /// Total gross leverage cap
    GrossLeverage,
    /// Drawdown circuit breaker engaged
    DrawdownBreaker,
}

/// One recoverable risk-limit breach, resolved by proportional scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLimitBreach {
    /// Limit that was hit
    pub kind: BreachKind,
    /// Offending symbol or class ("*" for book-wide clips)
    pub scope: String,
    /// Exposure before the clip
    pub observed: f64,
    /// Configured limit
    pub limit: f64,
    /// Scale factor that was applied
    pub scale: f64,
}

/// Stateful risk gate. State is the circuit-breaker engagement flag;
/// everything else is a pure function of the target and limits.
#[derive(Debug, Clone)]
pub struct RiskGate {
    config: RiskLimitsConfig,
    breaker_engaged: bool,
}

impl RiskGate {
    /// Creates a gate from limits.
    #[must_use]
    pub fn new(config: RiskLimitsConfig) -> Self {
        Self {
            config,
            breaker_engaged: false,
        }
    }

    /// Whether the drawdown breaker is currently engaged.
    #[must_use]
    pub fn breaker_engaged(&self) -> bool {
        self.breaker_engaged
    }

    /// Clips `target` in place to satisfy every hard limit.
    ///
    /// Returns the breach events; an empty vector means the book was already
    /// feasible. Symbols the gate rescales are marked active so the clipped
    /// book is actually traded down.
    pub fn apply(
        &mut self,
        target: &mut ReconciledTarget,
        state: &PortfolioState,
    ) -> Vec<RiskLimitBreach> {
        let mut breaches = Vec::new();

        self.apply_per_asset_cap(target, &mut breaches);
        self.apply_class_caps(target, &mut breaches);
        self.apply_gross_cap(target, &mut breaches);
        self.apply_drawdown_breaker(target, state, &mut breaches);

        for breach in &breaches {
            tracing::warn!(
                kind = ?breach.kind,
                scope = %breach.scope,
                observed = breach.observed,
                limit = breach.limit,
                scale = breach.scale,
                "risk limit breach"
            );
        }

        breaches
    }

    fn apply_per_asset_cap(
        &self,
        target: &mut ReconciledTarget,
        breaches: &mut Vec<RiskLimitBreach>,
    ) {
        let cap = self.config.per_asset_cap;
        if cap <= 0.0 {
            return;
        }

        let offenders: Vec<(String, f64)> = target
            .exposures
            .iter()
            .filter(|(_, e)| e.abs() > cap)
            .map(|(symbol, e)| (symbol.clone(), *e))
            .collect();

        for (symbol, exposure) in offenders {
            let scale = cap / exposure.abs();
            target.scale_symbol(&symbol, scale);
            breaches.push(RiskLimitBreach {
                kind: BreachKind::PerAsset,
                scope: symbol,
                observed: exposure.abs(),
                limit: cap,
                scale,
            });
        }
    }

    fn apply_class_caps(
        &self,
        target: &mut ReconciledTarget,
        breaches: &mut Vec<RiskLimitBreach>,
    ) {
        for (class, cap) in &self.config.class_caps {
            if *cap <= 0.0 {
                continue;
            }

            let members: Vec<String> = target
                .exposures
                .keys()
                .filter(|symbol| self.config.asset_classes.get(*symbol) == Some(class))
                .cloned()
                .collect();

            let gross: f64 = members
                .iter()
                .map(|symbol| target.exposures[symbol].abs())
                .sum();

            if gross > *cap {
                let scale = cap / gross;
                for symbol in &members {
                    target.scale_symbol(symbol, scale);
                }
                breaches.push(RiskLimitBreach {
                    kind: BreachKind::AssetClass,
                    scope: class.clone(),
                    observed: gross,
                    limit: *cap,
                    scale,
                });
            }
        }
    }

    fn apply_gross_cap(&self, target: &mut ReconciledTarget, breaches: &mut Vec<RiskLimitBreach>) {
        let cap = self.config.gross_leverage_cap;
        if cap <= 0.0 {
            return;
        }

        let gross = target.gross_exposure();
        if gross > cap {
            let scale = cap / gross;
            target.scale_all(scale);
            breaches.push(RiskLimitBreach {
                kind: BreachKind::GrossLeverage,
                scope: "*".to_string(),
                observed: gross,
                limit: cap,
                scale,
            });
        }
    }

    fn apply_drawdown_breaker(
        &mut self,
        target: &mut ReconciledTarget,
        state: &PortfolioState,
        breaches: &mut Vec<RiskLimitBreach>,
    ) {
        let dd = &self.config.drawdown;
        if !dd.enabled {
            return;
        }

        // Hysteresis: trip at -threshold, release only above -reset_threshold.
        let mut just_tripped = false;
        if !self.breaker_engaged && state.drawdown <= -dd.threshold {
            self.breaker_engaged = true;
            just_tripped = true;
        } else if self.breaker_engaged && state.drawdown >= -dd.reset_threshold {
            self.breaker_engaged = false;
        }

        if !self.breaker_engaged {
            return;
        }

        // The factor applies to the whole book once, on the trip bar. On
        // later engaged bars only fresh rebalance intent is derisked: a held
        // book was already scaled when the breaker tripped, and multiplying
        // it again every bar would compound the factor out of the carried
        // exposure.
        let scaled = if just_tripped {
            target.scale_all(dd.derisk_factor);
            !target.exposures.is_empty()
        } else {
            let fresh: Vec<String> = target.active.iter().cloned().collect();
            for symbol in &fresh {
                target.scale_symbol(symbol, dd.derisk_factor);
            }
            !fresh.is_empty()
        };

        if scaled {
            breaches.push(RiskLimitBreach {
                kind: BreachKind::DrawdownBreaker,
                scope: "*".to_string(),
                observed: state.drawdown,
                limit: -dd.threshold,
                scale: dd.derisk_factor,
            });
        }
    }
}
