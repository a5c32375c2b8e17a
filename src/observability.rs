use crate::engine::ValidationError;
use crate::model::Phase;

// ── Validation metrics ──────────────────────────────────────────

/// Counter: validations run. Labels: phase, outcome.
pub const VALIDATIONS_TOTAL: &str = "slotguard_validations_total";

// ── Selection metrics ───────────────────────────────────────────

/// Counter: clicks handled by a selection. Labels: transition.
pub const SELECTION_CLICKS_TOTAL: &str = "slotguard_selection_clicks_total";

/// Counter: confirmations attempted. Labels: outcome.
pub const CONFIRMATIONS_TOTAL: &str = "slotguard_confirmations_total";

/// Outcome label: `ok` or the short name of the failed check.
pub fn outcome_label(result: &Result<(), ValidationError>) -> &'static str {
    match result {
        Ok(()) => "ok",
        Err(e) => e.label(),
    }
}

pub(crate) fn record_validation(phase: Phase, result: &Result<(), ValidationError>) {
    metrics::counter!(
        VALIDATIONS_TOTAL,
        "phase" => phase.label(),
        "outcome" => outcome_label(result)
    )
    .increment(1);
}
