//! Campaign drivers.
//!
//! A search campaign evaluates the parameter space against the base config
//! over one date range. A walk-forward campaign takes the search's best
//! candidates and re-runs them per validation window, rejecting the ones
//! that fail to generalize.

use meridian_backtest::date::{parse_datetime_ns, DateBoundary};
use meridian_data::MarketStore;
use meridian_metrics::ScoreWeights;
use meridian_search::{run_search, CancellationToken, ParamSpace, SearchMethod};
use meridian_types::{FitnessRecord, SimulationConfig};
use meridian_walkforward::{
    ValidationCriteria, WalkForwardPlan, WalkForwardReport, WalkForwardValidator, WindowSpec,
};
use serde::{Deserialize, Serialize};

use crate::error::CampaignError;
use crate::objective::build_objective;
use crate::overrides::apply_overrides;

/// Walk-forward stage of a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardCampaign {
    /// Window plan
    pub plan: WalkForwardPlan,
    /// Acceptance criteria
    #[serde(default)]
    pub criteria: ValidationCriteria,
    /// Number of top search candidates to validate
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    5
}

/// A full campaign configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Base simulation config; searched parameters override it per candidate
    pub simulation: SimulationConfig,
    /// The declared parameter space
    pub space: ParamSpace,
    /// Search method and hyperparameters
    pub method: SearchMethod,
    /// Composite score weights
    #[serde(default)]
    pub score_weights: ScoreWeights,
    /// Seed for the search engine's own randomness
    #[serde(default = "default_search_seed")]
    pub search_seed: u64,
    /// Optional walk-forward stage
    #[serde(default)]
    pub walk_forward: Option<WalkForwardCampaign>,
}

fn default_search_seed() -> u64 {
    42
}

/// Outcome of one campaign: every evaluated record (best first) plus the
/// walk-forward reports for validated candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignResult {
    /// All fitness records, sorted best-first
    pub records: Vec<FitnessRecord>,
    /// Walk-forward reports (empty when no walk-forward stage configured)
    pub reports: Vec<WalkForwardReport>,
}

/// Runs a search campaign, then the optional walk-forward stage.
///
/// # Errors
/// Returns [`CampaignError`] for setup problems: an invalid space, a
/// parameter that names no config field, a malformed window plan. Failures
/// of individual candidates surface as sentinel-scored records instead.
pub fn run_search_campaign(
    config: &CampaignConfig,
    data: &MarketStore,
    token: &CancellationToken,
) -> Result<CampaignResult, CampaignError> {
    meridian_backtest::validate_config(&config.simulation)?;
    config.space.validate()?;
    validate_space_paths(config)?;

    let objective = build_objective(&config.simulation, data, config.score_weights);
    let records = run_search(
        &config.space,
        &objective,
        &config.method,
        config.search_seed,
        token,
    )?;

    let feasible = records.iter().filter(|r| r.feasible).count();
    tracing::info!(
        total = records.len(),
        feasible,
        "search campaign complete"
    );

    let reports = match &config.walk_forward {
        Some(walk_forward) if !token.is_cancelled() => {
            run_walk_forward(config, walk_forward, &records, data)?
        }
        _ => Vec::new(),
    };

    Ok(CampaignResult { records, reports })
}

/// Validates the top search candidates on held-out windows.
///
/// # Errors
/// Returns [`CampaignError`] for a malformed plan or windows that overlap
/// the training range.
pub fn run_walk_forward(
    config: &CampaignConfig,
    walk_forward: &WalkForwardCampaign,
    records: &[FitnessRecord],
    data: &MarketStore,
) -> Result<Vec<WalkForwardReport>, CampaignError> {
    let validator =
        WalkForwardValidator::new(walk_forward.plan.clone(), walk_forward.criteria)?;
    check_window_layout(validator.plan())?;
    warn_on_mislabeled_adverse_windows(validator.plan(), data);

    let mut reports = Vec::new();
    for record in records
        .iter()
        .filter(|r| r.feasible)
        .take(walk_forward.top_n)
    {
        let report = validator.validate(record.parameter_set.clone(), |params, window| {
            evaluate_window(config, params, window, data)
        });
        reports.push(report);
    }

    let accepted = reports.iter().filter(|r| r.verdict.is_accepted()).count();
    tracing::info!(
        validated = reports.len(),
        accepted,
        "walk-forward stage complete"
    );
    Ok(reports)
}

/// One window evaluation: candidate overrides plus the window's date range.
fn evaluate_window(
    config: &CampaignConfig,
    params: &meridian_types::ParameterSet,
    window: &WindowSpec,
    data: &MarketStore,
) -> FitnessRecord {
    let mut base = config.simulation.clone();
    base.start_date = window.start_date.clone();
    base.end_date = window.end_date.clone();

    let objective = build_objective(&base, data, config.score_weights);
    objective(params)
}

/// Every searched path must land on the base config; catching a typo here
/// costs one override pass instead of a campaign of sentinel scores.
fn validate_space_paths(config: &CampaignConfig) -> Result<(), CampaignError> {
    let mut probe = meridian_types::ParameterSet::default();
    for spec in &config.space.params {
        probe.values.insert(spec.name.clone(), spec.grid_values()[0]);
    }
    apply_overrides(&config.simulation, &probe).map(|_| ())
}

/// Validation windows must be disjoint from the training window; an overlap
/// leaks in-sample data into "out-of-sample" scores.
fn check_window_layout(plan: &WalkForwardPlan) -> Result<(), CampaignError> {
    let range = |window: &WindowSpec| -> Result<(i64, i64), CampaignError> {
        let start = parse_datetime_ns(&window.start_date, DateBoundary::Start)?;
        let end = parse_datetime_ns(&window.end_date, DateBoundary::End)?;
        if start >= end {
            return Err(CampaignError::Config(format!(
                "window '{}': start must be before end",
                window.id
            )));
        }
        Ok((start, end))
    };

    let (train_start, train_end) = range(&plan.train)?;
    for window in &plan.validation {
        let (start, end) = range(window)?;
        if start <= train_end && end >= train_start {
            return Err(CampaignError::Config(format!(
                "validation window '{}' overlaps the training window",
                window.id
            )));
        }
    }
    Ok(())
}

/// Sanity-check the adverse flags against the data: a window marked adverse
/// in a market that actually rose is probably a config slip.
fn warn_on_mislabeled_adverse_windows(plan: &WalkForwardPlan, data: &MarketStore) {
    for window in &plan.validation {
        let Some(market_return) = window_market_return(window, data) else {
            continue;
        };
        if window.adverse && market_return > 0.0 {
            tracing::warn!(
                window = %window.id,
                market_return,
                "window marked adverse but the market rose over it"
            );
        }
    }
}

fn window_market_return(window: &WindowSpec, data: &MarketStore) -> Option<f64> {
    let start = parse_datetime_ns(&window.start_date, DateBoundary::Start).ok()?;
    let end = parse_datetime_ns(&window.end_date, DateBoundary::End).ok()?;
    let sliced = data.slice_by_time(start, end).ok()?;
    if sliced.len() < 2 {
        return None;
    }

    let first = sliced.closes_at(0);
    let last = sliced.closes_at(sliced.len() - 1);
    let mut sum = 0.0;
    let mut count = 0usize;
    for (symbol, open_close) in &first {
        if let Some(final_close) = last.get(symbol) {
            if *open_close > 0.0 {
                sum += final_close / open_close - 1.0;
                count += 1;
            }
        }
    }
    if count == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = sum / count as f64;
    Some(mean)
}
