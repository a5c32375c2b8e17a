use tracing::trace;

use crate::model::*;

/// Rules enforced for `slot` on `day`, in configuration order.
///
/// A rule applies when it lists the day and either runs all day or the slot
/// lies entirely before `validBefore` / after `validAfter` (bounds inclusive).
/// A rule with none of the three never applies.
pub fn applicable_rules<'a>(
    rules: &'a [BookingRule],
    day: Weekday,
    slot: CandidateSlot,
) -> Vec<&'a BookingRule> {
    rules
        .iter()
        .filter(|r| applies_on(r, day, &slot))
        .collect()
}

/// [`applicable_rules`] plus peak and lead-time gating from `ctx`.
///
/// `onlyInPeak` / `onlyInOffPeak` look at the hour the slot starts in. A rule
/// with `allowDaysAhead = n` is lifted for bookings made `n` or fewer days
/// ahead.
pub fn applicable_rules_in<'a>(
    rules: &'a [BookingRule],
    ctx: &RuleContext,
    slot: CandidateSlot,
) -> Vec<&'a BookingRule> {
    let in_peak = ctx.peak.is_some_and(|p| p.contains(slot.start));
    rules
        .iter()
        .filter(|r| applies_on(r, ctx.day, &slot))
        .filter(|r| {
            let keep = (!r.only_in_peak || in_peak) && (!r.only_in_off_peak || !in_peak);
            if !keep {
                trace!(rule = %r.id, in_peak, "rule skipped outside its peak window");
            }
            keep
        })
        .filter(|r| match (r.allow_days_ahead, ctx.days_ahead) {
            (Some(allowed), Some(ahead)) if ahead <= allowed => {
                trace!(rule = %r.id, ahead, allowed, "rule lifted for short-notice booking");
                false
            }
            _ => true,
        })
        .collect()
}

fn applies_on(rule: &BookingRule, day: Weekday, slot: &CandidateSlot) -> bool {
    if !rule.days.contains(&day) {
        return false;
    }
    let before = rule
        .valid_before
        .is_some_and(|b| slot.start <= b && slot.end <= b);
    let after = rule
        .valid_after
        .is_some_and(|a| slot.start >= a && slot.end >= a);
    rule.all_day || before || after
}
