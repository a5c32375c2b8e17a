use crate::model::*;

use super::interval::{booked_minutes_within, following, preceding, violates_distance};
use super::{DistanceTo, ValidationError};

/// Spacing to the opening hour, the closing hour and the neighbouring
/// bookings. Each gap must be zero or at least `minDistanceBetweenSlots`.
pub(crate) fn check_distance(
    rule: &BookingRule,
    opening: OpeningHours,
    existing: &[ExistingBooking],
    slot: &CandidateSlot,
    phase: Phase,
) -> Result<(), ValidationError> {
    let Some(min_distance) = rule.min_distance_between_slots else {
        return Ok(());
    };
    let fail = |distance: Minutes, to: DistanceTo| -> Result<(), ValidationError> {
        Err(ValidationError::Distance {
            rule: rule.id.clone(),
            min_distance,
            distance,
            to,
        })
    };

    // A stretch that is already fully booked up to the boundary is no gap.
    let to_opening = (slot.start - opening.open) * MINUTES_PER_HOUR;
    if violates_distance(to_opening, min_distance)
        && booked_minutes_within(existing, Span::new(opening.open, slot.start)) != to_opening
    {
        return fail(to_opening, DistanceTo::Opening);
    }

    if phase.is_final() {
        let to_closing = (opening.close - 1 - slot.end) * MINUTES_PER_HOUR;
        if violates_distance(to_closing, min_distance)
            && booked_minutes_within(existing, Span::new(slot.end + 1, opening.close)) != to_closing
        {
            return fail(to_closing, DistanceTo::Closing);
        }
    }

    if let Some(before) = preceding(existing, slot) {
        let distance = (slot.start - before.until) * MINUTES_PER_HOUR;
        if violates_distance(distance, min_distance) {
            return fail(distance, DistanceTo::PrecedingBooking(before.id));
        }
    }

    if slot.is_range()
        && let Some(after) = following(existing, slot)
    {
        let distance = (after.from - slot.end - 1) * MINUTES_PER_HOUR;
        if violates_distance(distance, min_distance) {
            return fail(distance, DistanceTo::FollowingBooking(after.id));
        }
    }

    Ok(())
}
