use crate::model::*;

use super::interval::enclosing_gap;
use super::{LengthViolation, ValidationError};

/// Minimum length, multiples-of-length and the fill-slot exception.
///
/// A shortfall is only an error in the final phase: while the range is being
/// built the next click may still make it long enough.
pub(crate) fn check_length(
    rule: &BookingRule,
    opening: OpeningHours,
    existing: &[ExistingBooking],
    slot: &CandidateSlot,
    phase: Phase,
) -> Result<(), ValidationError> {
    let Some(min_length) = rule.min_length else {
        return Ok(());
    };
    let length = slot.occupied_minutes();
    let fail = |kind: LengthViolation| -> Result<(), ValidationError> {
        Err(ValidationError::MinLength {
            rule: rule.id.clone(),
            min_length,
            length,
            kind,
        })
    };

    if length >= min_length {
        // Multiples are counted between the first and last selected mark.
        if rule.require_multiples_of_length
            && slot.is_range()
            && slot.span_minutes() % min_length != 0
        {
            return fail(LengthViolation::NotMultiple);
        }
        return Ok(());
    }

    if !phase.is_final() {
        return Ok(());
    }

    if rule.allow_fill_slots {
        let gap = enclosing_gap(opening, existing, slot);
        if length == gap {
            return Ok(());
        }
        if length < gap && slot.is_range() {
            return fail(LengthViolation::PartialFill { gap });
        }
    }
    fail(LengthViolation::TooShort)
}
