use crate::model::Hour;

/// Hour marks live on a single day.
pub const MIN_HOUR: Hour = 0;
pub const MAX_HOUR: Hour = 24;

pub const MAX_OPTIONS: usize = 64;
pub const MAX_RULES_PER_OPTION: usize = 64;
pub const MAX_RULE_ID_LEN: usize = 128;

/// Bookings on one day of one room. Anything beyond a day's worth of
/// one-hour bookings is malformed input.
pub const MAX_EXISTING_BOOKINGS: usize = 24;
