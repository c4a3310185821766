//! Helpers for equity-curve derived metrics.

use meridian_types::EquityPoint;

const NS_PER_YEAR: f64 = 365.25 * 86_400.0 * 1e9;

/// Compound annual growth rate from the NAV endpoints.
#[must_use]
pub fn compute_cagr(equity: &[EquityPoint]) -> f64 {
    let (Some(first), Some(last)) = (equity.first(), equity.last()) else {
        return 0.0;
    };
    if first.nav <= 0.0 || last.nav <= 0.0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let elapsed_ns = (last.timestamp_ns - first.timestamp_ns) as f64;
    if elapsed_ns <= 0.0 {
        return 0.0;
    }

    let years = elapsed_ns / NS_PER_YEAR;
    (last.nav / first.nav).powf(1.0 / years) - 1.0
}

/// Maximum drawdown, `nav / peak - 1` convention (<= 0).
///
/// Recomputed from the NAV series rather than trusting the stored drawdown
/// field, so the metric stays correct even for curves assembled elsewhere.
#[must_use]
pub fn compute_max_drawdown(equity: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd: f64 = 0.0;

    for point in equity {
        if point.nav > peak {
            peak = point.nav;
        }
        if peak > 0.0 {
            max_dd = max_dd.min(point.nav / peak - 1.0);
        }
    }

    max_dd
}

/// Annualized Sharpe ratio from per-bar NAV returns.
///
/// Annualization uses the median bar spacing, so the scale factor adapts to
/// whatever cadence the curve was sampled at.
#[must_use]
pub fn compute_sharpe(equity: &[EquityPoint]) -> f64 {
    if equity.len() < 3 {
        return 0.0;
    }

    let returns: Vec<f64> = equity
        .windows(2)
        .filter(|w| w[0].nav > 0.0)
        .map(|w| w[1].nav / w[0].nav - 1.0)
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    if std <= 0.0 {
        return 0.0;
    }

    let mut spacings: Vec<i64> = equity
        .windows(2)
        .map(|w| w[1].timestamp_ns - w[0].timestamp_ns)
        .filter(|s| *s > 0)
        .collect();
    if spacings.is_empty() {
        return 0.0;
    }
    spacings.sort_unstable();
    #[allow(clippy::cast_precision_loss)]
    let median_spacing = spacings[spacings.len() / 2] as f64;
    let periods_per_year = NS_PER_YEAR / median_spacing;

    mean / std * periods_per_year.sqrt()
}
