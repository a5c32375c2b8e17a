use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Hour of day, the only time type. No sub-hour resolution.
pub type Hour = i32;

/// Rule durations are configured in minutes.
pub type Minutes = i32;

pub const MINUTES_PER_HOUR: Minutes = 60;

/// Half-open interval of hours `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Hour,
    pub end: Hour,
}

impl Span {
    pub fn new(start: Hour, end: Hour) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> Minutes {
        (self.end - self.start) * MINUTES_PER_HOUR
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_hour(&self, h: Hour) -> bool {
        self.start <= h && h < self.end
    }
}

/// The day's bookable universe: `open` is the first bookable hour, `close` the
/// first hour the venue is shut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Hour, Hour)", into = "(Hour, Hour)")]
pub struct OpeningHours {
    pub open: Hour,
    pub close: Hour,
}

impl OpeningHours {
    pub fn new(open: Hour, close: Hour) -> Self {
        debug_assert!(open < close, "opening hours must open before they close");
        Self { open, close }
    }
}

impl From<(Hour, Hour)> for OpeningHours {
    fn from((open, close): (Hour, Hour)) -> Self {
        Self { open, close }
    }
}

impl From<OpeningHours> for (Hour, Hour) {
    fn from(h: OpeningHours) -> Self {
        (h.open, h.close)
    }
}

impl fmt::Display for OpeningHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.open, self.close)
    }
}

/// An already-committed reservation. `until` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingBooking {
    pub id: Ulid,
    pub from: Hour,
    pub until: Hour,
}

impl ExistingBooking {
    pub fn new(from: Hour, until: Hour) -> Self {
        Self::with_id(Ulid::new(), from, until)
    }

    pub fn with_id(id: Ulid, from: Hour, until: Hour) -> Self {
        debug_assert!(from < until, "booking must end after it starts");
        Self { id, from, until }
    }

    pub fn span(&self) -> Span {
        Span::new(self.from, self.until)
    }

    /// True if the booked hour `h` is taken by this booking.
    pub fn is_busy_at(&self, h: Hour) -> bool {
        self.span().contains_hour(h)
    }
}

/// The interval being validated. `end` is the last selected hour mark, so the
/// slot occupies `[start, end + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub start: Hour,
    pub end: Hour,
}

impl CandidateSlot {
    pub fn new(start: Hour, end: Hour) -> Self {
        debug_assert!(start <= end, "slot end mark must not precede its start");
        Self { start, end }
    }

    pub fn single(mark: Hour) -> Self {
        Self::new(mark, mark)
    }

    /// True once the user has extended the selection past its first mark.
    pub fn is_range(&self) -> bool {
        self.start < self.end
    }

    /// Minutes occupied by the selected hours, end mark included.
    pub fn occupied_minutes(&self) -> Minutes {
        (self.end + 1 - self.start) * MINUTES_PER_HOUR
    }

    /// Minutes between the first and the last selected mark.
    pub fn span_minutes(&self) -> Minutes {
        (self.end - self.start) * MINUTES_PER_HOUR
    }

    /// Hours compared against existing bookings. A range covers `[start, end)`,
    /// a single mark covers its own hour.
    pub fn footprint(&self) -> Span {
        Span::new(self.start, self.end.max(self.start + 1))
    }
}

impl fmt::Display for CandidateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
            Weekday::Sun => "sun",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|d| d.code() == lower)
            .ok_or_else(|| format!("unknown weekday: {s}"))
    }
}

/// Peak hours of a weekday. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Hour, Hour)", into = "(Hour, Hour)")]
pub struct PeakWindow {
    pub start: Hour,
    pub end: Hour,
}

impl PeakWindow {
    pub fn new(start: Hour, end: Hour) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, h: Hour) -> bool {
        self.start <= h && h <= self.end
    }
}

impl From<(Hour, Hour)> for PeakWindow {
    fn from((start, end): (Hour, Hour)) -> Self {
        Self { start, end }
    }
}

impl From<PeakWindow> for (Hour, Hour) {
    fn from(p: PeakWindow) -> Self {
        (p.start, p.end)
    }
}

/// A named constraint bundle. Applicability fields decide whether the rule is
/// checked at all; constraint fields are checked by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingRule {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub days: Vec<Weekday>,
    pub all_day: bool,
    pub only_in_peak: bool,
    pub only_in_off_peak: bool,
    pub valid_before: Option<Hour>,
    pub valid_after: Option<Hour>,
    /// Lift the rule for bookings made at most this many days ahead.
    pub allow_days_ahead: Option<u32>,

    pub min_length: Option<Minutes>,
    pub allow_fill_slots: bool,
    pub require_multiples_of_length: bool,
    /// Start-time grid, relative to opening.
    pub booking_interval: Option<Minutes>,
    pub min_distance_between_slots: Option<Minutes>,
}

impl BookingRule {
    /// A rule enforced all day on the given weekdays, with no constraints yet.
    pub fn all_day(id: impl Into<String>, days: &[Weekday]) -> Self {
        Self {
            id: id.into(),
            days: days.to_vec(),
            all_day: true,
            ..Self::default()
        }
    }

    /// Returns the first cross-field invariant this rule breaks, if any.
    pub fn defect(&self) -> Option<&'static str> {
        if self.min_length.is_none() && self.require_multiples_of_length {
            return Some("requireMultiplesOfLength needs minLength");
        }
        if self.min_length.is_none() && self.booking_interval.is_some() {
            return Some("bookingInterval needs minLength");
        }
        if self.min_length.is_some_and(|m| m <= 0) {
            return Some("minLength must be positive");
        }
        if let Some(g) = self.booking_interval {
            if g <= 0 {
                return Some("bookingInterval must be positive");
            }
            if g % MINUTES_PER_HOUR != 0 {
                return Some("bookingInterval must be a whole number of hours");
            }
        }
        if self.min_distance_between_slots.is_some_and(|d| d <= 0) {
            return Some("minDistanceBetweenSlots must be positive");
        }
        if self.only_in_peak && self.only_in_off_peak {
            return Some("onlyInPeak and onlyInOffPeak are mutually exclusive");
        }
        let in_day = |h: Option<Hour>| h.is_none_or(|h| (0..=24).contains(&h));
        if !in_day(self.valid_before) || !in_day(self.valid_after) {
            return Some("validBefore/validAfter must be an hour of the day");
        }
        None
    }
}

/// Validation phase. `Tentative` runs on every click while a range is still
/// being built; `Final` runs once on confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Tentative,
    Final,
}

impl Phase {
    pub fn is_final(&self) -> bool {
        matches!(self, Phase::Final)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Tentative => "tentative",
            Phase::Final => "final",
        }
    }
}

/// What the caller knows about the day being booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleContext {
    pub day: Weekday,
    pub peak: Option<PeakWindow>,
    /// Calendar days between today and the booked day, as resolved by the caller.
    pub days_ahead: Option<u32>,
}

impl RuleContext {
    pub fn new(day: Weekday) -> Self {
        Self {
            day,
            peak: None,
            days_ahead: None,
        }
    }
}
