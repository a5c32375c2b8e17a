use ulid::Ulid;

use crate::model::{CandidateSlot, Hour, MINUTES_PER_HOUR, Minutes, OpeningHours};

/// Why a length rule rejected the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthViolation {
    TooShort,
    /// Shorter than the rule but also shorter than the free gap it sits in.
    PartialFill { gap: Minutes },
    NotMultiple,
}

/// What a slot kept too little distance to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceTo {
    Opening,
    Closing,
    PrecedingBooking(Ulid),
    FollowingBooking(Ulid),
}

/// The first constraint a candidate slot breaks. `Display` renders the
/// message shown to the person booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    OutOfHours {
        opening: OpeningHours,
        slot: CandidateSlot,
    },
    Overlap {
        booking: Ulid,
        slot: CandidateSlot,
    },
    MinLength {
        rule: String,
        min_length: Minutes,
        length: Minutes,
        kind: LengthViolation,
    },
    Quantization {
        rule: String,
        start: Hour,
        allowed: Vec<Hour>,
    },
    Distance {
        rule: String,
        min_distance: Minutes,
        distance: Minutes,
        to: DistanceTo,
    },
}

impl ValidationError {
    /// Id of the rule that failed, `None` for bounds and overlap failures.
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            ValidationError::OutOfHours { .. } | ValidationError::Overlap { .. } => None,
            ValidationError::MinLength { rule, .. }
            | ValidationError::Quantization { rule, .. }
            | ValidationError::Distance { rule, .. } => Some(rule),
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ValidationError::OutOfHours { .. } => "out_of_hours",
            ValidationError::Overlap { .. } => "overlap",
            ValidationError::MinLength { kind, .. } => match kind {
                LengthViolation::TooShort => "min_length",
                LengthViolation::PartialFill { .. } => "partial_fill",
                LengthViolation::NotMultiple => "not_multiple",
            },
            ValidationError::Quantization { .. } => "quantization",
            ValidationError::Distance { to, .. } => match to {
                DistanceTo::Opening => "distance_opening",
                DistanceTo::Closing => "distance_closing",
                DistanceTo::PrecedingBooking(_) => "distance_preceding",
                DistanceTo::FollowingBooking(_) => "distance_following",
            },
        }
    }
}

/// Minutes as hours for messages: `180` → `3`, `90` → `1.5`.
pub(crate) fn hours(minutes: Minutes) -> String {
    if minutes % MINUTES_PER_HOUR == 0 {
        (minutes / MINUTES_PER_HOUR).to_string()
    } else {
        (f64::from(minutes) / f64::from(MINUTES_PER_HOUR)).to_string()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::OutOfHours { opening, .. } => {
                write!(f, "Selected slot isn't within opening hours ({opening})")
            }
            ValidationError::Overlap { .. } => {
                write!(f, "Selected slot is overlapping an existing slot")
            }
            ValidationError::MinLength {
                min_length, kind, ..
            } => {
                let n = hours(*min_length);
                match kind {
                    LengthViolation::TooShort => write!(f, "You have to book at least {n} hours"),
                    LengthViolation::PartialFill { .. } => write!(
                        f,
                        "You have to book at least {n} hours or fill the entire spot"
                    ),
                    LengthViolation::NotMultiple => {
                        let multiples: Vec<String> =
                            (1..=3).map(|k| format!("{}h", hours(min_length * k))).collect();
                        write!(
                            f,
                            "You have to book in multiples of {n} hours (i.e. {} etc...)",
                            multiples.join(", ")
                        )
                    }
                }
            }
            ValidationError::Quantization { allowed, .. } => {
                let starts: Vec<String> = allowed.iter().map(|h| format!("{h:02}:00")).collect();
                write!(f, "You can only book slots starting at {}", starts.join(", "))
            }
            ValidationError::Distance {
                min_distance, to, ..
            } => {
                let what = match to {
                    DistanceTo::Opening => "the opening hour",
                    DistanceTo::Closing => "the closing hour",
                    DistanceTo::PrecedingBooking(_) | DistanceTo::FollowingBooking(_) => {
                        "existing bookings"
                    }
                };
                write!(
                    f,
                    "Please leave no gap or at least {} hours between {what} and your slot",
                    hours(*min_distance)
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
