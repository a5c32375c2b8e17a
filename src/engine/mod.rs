mod applicability;
mod conflict;
mod distance;
mod error;
mod interval;
mod length;
mod quantize;

pub use applicability::{applicable_rules, applicable_rules_in};
pub use conflict::overlaps_booking;
pub use error::{DistanceTo, LengthViolation, ValidationError};
pub use quantize::interval_starts;

use tracing::debug;

use crate::model::*;
use crate::observability;

/// Decide whether `slot` may be booked.
///
/// Checks run in a fixed order and the first failure is returned: opening
/// hours, overlap with `existing`, then for each rule in order its length,
/// start-time grid and spacing constraints. `Phase::Tentative` skips the
/// checks that only make sense once the range is complete (length shortfall,
/// distance to closing).
///
/// Pure: no state is kept between calls.
pub fn validate<'r>(
    opening: OpeningHours,
    existing: &[ExistingBooking],
    rules: impl IntoIterator<Item = &'r BookingRule>,
    slot: CandidateSlot,
    phase: Phase,
) -> Result<(), ValidationError> {
    let result = run_checks(opening, existing, rules, &slot, phase);
    match &result {
        Ok(()) => debug!(%slot, phase = phase.label(), "slot accepted"),
        Err(e) => debug!(
            %slot,
            phase = phase.label(),
            reason = e.label(),
            rule = e.rule_id().unwrap_or("-"),
            "slot rejected: {e}"
        ),
    }
    observability::record_validation(phase, &result);
    result
}

fn run_checks<'r>(
    opening: OpeningHours,
    existing: &[ExistingBooking],
    rules: impl IntoIterator<Item = &'r BookingRule>,
    slot: &CandidateSlot,
    phase: Phase,
) -> Result<(), ValidationError> {
    conflict::check_bounds(opening, slot)?;
    conflict::check_overlap(existing, slot)?;

    for rule in rules {
        debug_assert!(
            rule.defect().is_none(),
            "malformed rule {}: {:?}",
            rule.id,
            rule.defect()
        );
        length::check_length(rule, opening, existing, slot, phase)?;
        quantize::check_interval(rule, opening, slot)?;
        distance::check_distance(rule, opening, existing, slot, phase)?;
    }
    Ok(())
}
