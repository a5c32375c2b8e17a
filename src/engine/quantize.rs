use crate::model::*;

use super::ValidationError;

/// Legal start marks for a grid of `interval` minutes anchored at opening:
/// `open, open + g, open + 2g, ...` while before closing.
pub fn interval_starts(opening: OpeningHours, interval: Minutes) -> Vec<Hour> {
    let step = interval / MINUTES_PER_HOUR;
    debug_assert!(step > 0, "booking interval must cover at least one hour");
    (opening.open..opening.close).step_by(step.max(1) as usize).collect()
}

/// The grid constrains only where a booking starts, so it is checked while a
/// single mark is selected and skipped once the range is extended.
pub(crate) fn check_interval(
    rule: &BookingRule,
    opening: OpeningHours,
    slot: &CandidateSlot,
) -> Result<(), ValidationError> {
    let Some(interval) = rule.booking_interval else {
        return Ok(());
    };
    if slot.is_range() {
        return Ok(());
    }
    let allowed = interval_starts(opening, interval);
    if allowed.contains(&slot.start) {
        return Ok(());
    }
    Err(ValidationError::Quantization {
        rule: rule.id.clone(),
        start: slot.start,
        allowed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(interval: Minutes) -> BookingRule {
        BookingRule {
            min_length: Some(120),
            booking_interval: Some(interval),
            ..BookingRule::all_day("grid", &[Weekday::Tue])
        }
    }

    #[test]
    fn starts_stop_before_closing() {
        assert_eq!(interval_starts(OpeningHours::new(10, 22), 240), vec![10, 14, 18]);
        assert_eq!(interval_starts(OpeningHours::new(10, 24), 240), vec![10, 14, 18, 22]);
        assert_eq!(interval_starts(OpeningHours::new(10, 13), 60), vec![10, 11, 12]);
    }

    #[test]
    fn off_grid_start_lists_allowed_starts() {
        let err = check_interval(&grid(240), OpeningHours::new(10, 22), &CandidateSlot::single(13))
            .unwrap_err();
        assert_eq!(err.to_string(), "You can only book slots starting at 10:00, 14:00, 18:00");
    }

    #[test]
    fn on_grid_start_passes() {
        let opening = OpeningHours::new(10, 22);
        assert!(check_interval(&grid(240), opening, &CandidateSlot::single(14)).is_ok());
    }

    #[test]
    fn extended_range_is_not_checked() {
        let opening = OpeningHours::new(10, 22);
        assert!(check_interval(&grid(240), opening, &CandidateSlot::new(13, 15)).is_ok());
    }

    #[test]
    fn early_hours_are_zero_padded() {
        let err = check_interval(&grid(180), OpeningHours::new(8, 15), &CandidateSlot::single(9))
            .unwrap_err();
        assert_eq!(err.to_string(), "You can only book slots starting at 08:00, 11:00, 14:00");
    }
}
