/// Main simulation configuration
#[derive(Debug, Clone, serde::Serialize)]
pub struct SimulationConfig {
    /// Schema version
    pub schema_version: String,
    /// Start date (ISO format)
    pub start_date: String,
    /// End date (ISO format)
    pub end_date: String,
    /// Traded universe
    pub universe: Vec<String>,
    /// Run mode
    pub run_mode: RunMode,
    /// Initial net asset value
    #[serde(default = "default_initial_nav")]
    pub initial_nav: f64,
    /// Global leverage multiplier applied once per rebalance decision
    #[serde(default = "default_leverage")]
    pub leverage_multiplier: f64,
    /// Strategy slots
    pub strategies: Vec<StrategySlotConfig>,
    /// Warmup bars before trading starts
    #[serde(default = "default_warmup")]
    pub warmup_bars: usize,
    /// RNG seed for reproducibility
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Risk limit configuration
    #[serde(default)]
    pub risk: RiskLimitsConfig,
    /// Execution cost configuration
    #[serde(default)]
    pub costs: CostsConfig,
    /// Context provider configuration
    #[serde(default)]
    pub context: ContextConfig,
    /// Price reference for fills
    #[serde(default)]
    pub price_reference: PriceReference,
    /// Minimum trade size as a NAV fraction; smaller deltas are dropped
    #[serde(default = "default_min_trade_fraction")]
    pub min_trade_fraction: f64,
    /// Wall-clock budget for one evaluation (None = unbounded)
    #[serde(default)]
    pub max_eval_seconds: Option<f64>,
}

const DEFAULT_RNG_SEED: u64 = 42;

#[derive(Debug, Clone, serde::Deserialize)]
struct SimulationConfigRaw {
    pub schema_version: String,
    pub start_date: String,
    pub end_date: String,
    pub universe: Vec<String>,
    pub run_mode: RunMode,
    #[serde(default = "default_initial_nav")]
    pub initial_nav: f64,
    #[serde(default = "default_leverage")]
    pub leverage_multiplier: f64,
    pub strategies: Vec<StrategySlotConfig>,
    #[serde(default = "default_warmup")]
    pub warmup_bars: usize,
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default)]
    pub risk: RiskLimitsConfig,
    #[serde(default)]
    pub costs: CostsConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub price_reference: PriceReference,
    #[serde(default = "default_min_trade_fraction")]
    pub min_trade_fraction: f64,
    #[serde(default)]
    pub max_eval_seconds: Option<f64>,
}

impl From<SimulationConfigRaw> for SimulationConfig {
    fn from(raw: SimulationConfigRaw) -> Self {
        let rng_seed = match raw.run_mode {
            RunMode::Dev => Some(raw.rng_seed.unwrap_or(DEFAULT_RNG_SEED)),
            RunMode::Prod => raw.rng_seed,
        };

        Self {
            schema_version: raw.schema_version,
            start_date: raw.start_date,
            end_date: raw.end_date,
            universe: raw.universe,
            run_mode: raw.run_mode,
            initial_nav: raw.initial_nav,
            leverage_multiplier: raw.leverage_multiplier,
            strategies: raw.strategies,
            warmup_bars: raw.warmup_bars,
            rng_seed,
            risk: raw.risk,
            costs: raw.costs,
            context: raw.context,
            price_reference: raw.price_reference,
            min_trade_fraction: raw.min_trade_fraction,
            max_eval_seconds: raw.max_eval_seconds,
        }
    }
}

impl<'de> serde::Deserialize<'de> for SimulationConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = SimulationConfigRaw::deserialize(deserializer)?;
        Ok(raw.into())
    }
}

fn default_initial_nav() -> f64 {
    100_000.0
}
fn default_leverage() -> f64 {
    1.0
}
fn default_warmup() -> usize {
    50
}
fn default_min_trade_fraction() -> f64 {
    0.001
}

/// Run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Development mode (seed pinned by default)
    #[default]
    Dev,
    /// Production mode
    Prod,
}

/// Price reference for order fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceReference {
    /// Fill at the next bar's open
    #[default]
    NextOpen,
    /// Fill at the decision bar's close
    Close,
}

/// One strategy slot: model, identity, and budget share.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StrategySlotConfig {
    /// Registered strategy name
    pub name: String,
    /// Unique slot id (defaults to the name)
    #[serde(default)]
    pub strategy_id: Option<String>,
    /// Fraction of NAV budgeted to this slot (0-1)
    pub budget_fraction: f64,
    /// Strategy-specific parameters
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl StrategySlotConfig {
    /// Effective slot id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.strategy_id.as_deref().unwrap_or(&self.name)
    }
}

// ============================================
// SUB-CONFIGS
// ============================================

/// Hard risk limits enforced by the risk gate.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RiskLimitsConfig {
    /// Cap on any single symbol's absolute NAV fraction
    #[serde(default = "default_per_asset_cap")]
    pub per_asset_cap: f64,
    /// Symbol -> asset class mapping
    #[serde(default)]
    pub asset_classes: std::collections::BTreeMap<String, String>,
    /// Per-class gross exposure caps
    #[serde(default)]
    pub class_caps: std::collections::BTreeMap<String, f64>,
    /// Cap on total gross exposure
    #[serde(default = "default_gross_cap")]
    pub gross_leverage_cap: f64,
    /// Drawdown circuit breaker
    #[serde(default)]
    pub drawdown: DrawdownConfig,
}

fn default_per_asset_cap() -> f64 {
    1.0
}
fn default_gross_cap() -> f64 {
    2.0
}

impl Default for RiskLimitsConfig {
    fn default() -> Self {
        Self {
            per_asset_cap: default_per_asset_cap(),
            asset_classes: std::collections::BTreeMap::new(),
            class_caps: std::collections::BTreeMap::new(),
            gross_leverage_cap: default_gross_cap(),
            drawdown: DrawdownConfig::default(),
        }
    }
}

/// Drawdown circuit breaker with hysteresis.
///
/// Trips when drawdown reaches `-threshold`, de-risks the whole book by
/// `derisk_factor`, and stays engaged until drawdown recovers above
/// `-reset_threshold`. `reset_threshold` must be below `threshold` or the
/// breaker would flap around a single level.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DrawdownConfig {
    /// Enable the circuit breaker
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Trip level as a positive fraction (0.2 = trip at -20%)
    #[serde(default = "default_dd_threshold")]
    pub threshold: f64,
    /// Recovery level as a positive fraction; must be < threshold
    #[serde(default = "default_dd_reset")]
    pub reset_threshold: f64,
    /// Book multiplier while engaged
    #[serde(default = "default_derisk_factor")]
    pub derisk_factor: f64,
}

fn default_true() -> bool {
    true
}
fn default_dd_threshold() -> f64 {
    0.20
}
fn default_dd_reset() -> f64 {
    0.10
}
fn default_derisk_factor() -> f64 {
    0.5
}

impl Default for DrawdownConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            threshold: default_dd_threshold(),
            reset_threshold: default_dd_reset(),
            derisk_factor: default_derisk_factor(),
        }
    }
}

/// Execution cost model configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CostsConfig {
    /// Enable cost simulation
    #[serde(default = "default_costs_enabled")]
    pub enabled: bool,
    /// Commission in basis points of notional
    #[serde(default = "default_commission_bps")]
    pub commission_bps: f64,
    /// Minimum commission per order
    #[serde(default)]
    pub commission_min: f64,
    /// Base slippage in basis points
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: f64,
    /// Random slippage jitter in basis points (uniform, seeded)
    #[serde(default)]
    pub slippage_jitter_bps: f64,
}

fn default_costs_enabled() -> bool {
    true
}
fn default_commission_bps() -> f64 {
    2.0
}
fn default_slippage_bps() -> f64 {
    1.0
}

impl Default for CostsConfig {
    fn default() -> Self {
        Self {
            enabled: default_costs_enabled(),
            commission_bps: default_commission_bps(),
            commission_min: 0.0,
            slippage_bps: default_slippage_bps(),
            slippage_jitter_bps: 0.0,
        }
    }
}

/// Context provider configuration (feature and regime lookbacks).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ContextConfig {
    /// Trailing window for per-asset features
    #[serde(default = "default_feature_lookback")]
    pub feature_lookback_bars: usize,
    /// Trailing window for regime classification
    #[serde(default = "default_regime_lookback")]
    pub regime_lookback_bars: usize,
    /// Absolute trailing-return threshold separating trend from sideways
    #[serde(default = "default_regime_threshold")]
    pub regime_threshold: f64,
}

fn default_feature_lookback() -> usize {
    20
}
fn default_regime_lookback() -> usize {
    40
}
fn default_regime_threshold() -> f64 {
    0.03
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            feature_lookback_bars: default_feature_lookback(),
            regime_lookback_bars: default_regime_lookback(),
            regime_threshold: default_regime_threshold(),
        }
    }
}
