use crate::model::*;

/// Nearest booking that ends at or before the slot starts.
pub(crate) fn preceding<'a>(
    existing: &'a [ExistingBooking],
    slot: &CandidateSlot,
) -> Option<&'a ExistingBooking> {
    existing
        .iter()
        .filter(|b| b.until <= slot.start)
        .fold(None, |best: Option<&ExistingBooking>, b| match best {
            Some(prev) if prev.until >= b.until => Some(prev),
            _ => Some(b),
        })
}

/// Nearest booking that starts at or after the slot's last mark.
pub(crate) fn following<'a>(
    existing: &'a [ExistingBooking],
    slot: &CandidateSlot,
) -> Option<&'a ExistingBooking> {
    existing
        .iter()
        .filter(|b| b.from >= slot.end)
        .fold(None, |best: Option<&ExistingBooking>, b| match best {
            Some(prev) if prev.from <= b.from => Some(prev),
            _ => Some(b),
        })
}

/// Minutes of `window` already taken by bookings. Bookings are disjoint
/// (checked when a day plan is built), so clipped durations add up.
pub(crate) fn booked_minutes_within(existing: &[ExistingBooking], window: Span) -> Minutes {
    existing
        .iter()
        .filter(|b| b.span().overlaps(&window))
        .map(|b| Span::new(b.from.max(window.start), b.until.min(window.end)).duration_minutes())
        .sum()
}

/// Free stretch the slot sits in, bounded by the neighbouring bookings or by
/// the opening hours where there is no neighbour.
pub(crate) fn enclosing_gap(
    opening: OpeningHours,
    existing: &[ExistingBooking],
    slot: &CandidateSlot,
) -> Minutes {
    let lower = preceding(existing, slot).map_or(opening.open, |b| b.until);
    let upper = following(existing, slot).map_or(opening.close, |b| b.from);
    (upper - lower) * MINUTES_PER_HOUR
}

/// `0 < distance < min`. Touching (zero) and wide enough gaps are both fine.
pub(crate) fn violates_distance(distance: Minutes, min: Minutes) -> bool {
    distance > 0 && distance < min
}
