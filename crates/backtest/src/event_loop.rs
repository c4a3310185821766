//! Event loop driver.

use crate::engine::SimulationEngine;
use crate::error::SimulationError;

/// Runs the main simulation event loop.
///
/// Strictly sequential bar-by-bar: bar `t+1` is never visible while bar `t`
/// is being decided.
///
/// # Errors
/// Propagates the first error from any bar; partial state is discarded by
/// the caller.
pub fn run_event_loop(engine: &mut SimulationEngine) -> Result<(), SimulationError> {
    let warmup = engine.warmup_bars();
    let end = engine.decision_end();

    tracing::info!(
        "starting simulation: {} decision bars ({} warmup)",
        end.saturating_sub(warmup),
        warmup
    );

    for idx in warmup..end {
        engine.check_deadline(idx)?;
        engine.process_bar(idx)?;
    }

    Ok(())
}
