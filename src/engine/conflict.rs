use crate::model::*;

use super::ValidationError;

pub(crate) fn check_bounds(
    opening: OpeningHours,
    slot: &CandidateSlot,
) -> Result<(), ValidationError> {
    // The end mark is occupied, so it has to fall before closing.
    if slot.start < opening.open || slot.end >= opening.close {
        return Err(ValidationError::OutOfHours {
            opening,
            slot: *slot,
        });
    }
    Ok(())
}

/// True if the slot collides with `booking`: it starts inside the booking,
/// ends inside it while starting before its end, or swallows it whole.
pub fn overlaps_booking(slot: &CandidateSlot, booking: &ExistingBooking) -> bool {
    slot.footprint().overlaps(&booking.span())
}

pub(crate) fn check_overlap(
    existing: &[ExistingBooking],
    slot: &CandidateSlot,
) -> Result<(), ValidationError> {
    match existing.iter().find(|b| overlaps_booking(slot, b)) {
        Some(b) => Err(ValidationError::Overlap {
            booking: b.id,
            slot: *slot,
        }),
        None => Ok(()),
    }
}
