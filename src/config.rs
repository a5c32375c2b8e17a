use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use ulid::Ulid;

use crate::engine::{self, ValidationError, applicable_rules_in};
use crate::limits::*;
use crate::model::*;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidOpeningHours(OpeningHours),
    InvalidPeakWindow { day: Weekday, window: PeakWindow },
    InvalidRule { option: String, rule: String, reason: &'static str },
    InvalidBooking { from: Hour, until: Hour },
    OverlappingBookings(Ulid, Ulid),
    DuplicateOption(String),
    UnknownOption(String),
    UnavailableDay { option: String, day: Weekday },
    LimitExceeded(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "parse error: {e}"),
            ConfigError::InvalidOpeningHours(h) => write!(f, "invalid opening hours: {h}"),
            ConfigError::InvalidPeakWindow { day, window } => {
                write!(f, "invalid peak window on {day}: {} - {}", window.start, window.end)
            }
            ConfigError::InvalidRule {
                option,
                rule,
                reason,
            } => write!(f, "invalid rule {rule} in option {option}: {reason}"),
            ConfigError::InvalidBooking { from, until } => {
                write!(f, "invalid booking: {from} - {until}")
            }
            ConfigError::OverlappingBookings(a, b) => {
                write!(f, "bookings {a} and {b} overlap")
            }
            ConfigError::DuplicateOption(id) => write!(f, "duplicate booking option: {id}"),
            ConfigError::UnknownOption(id) => write!(f, "unknown booking option: {id}"),
            ConfigError::UnavailableDay { option, day } => {
                write!(f, "booking option {option} is not available on {day}")
            }
            ConfigError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// One bookable product of the venue, with its own rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOption {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub available_days: Vec<Weekday>,
    #[serde(default)]
    pub rules: Vec<BookingRule>,
}

impl BookingOption {
    pub fn is_available_on(&self, day: Weekday) -> bool {
        self.available_days.contains(&day)
    }
}

/// Static venue configuration: loaded once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub opening_hours: OpeningHours,
    #[serde(default)]
    pub peak_times: HashMap<Weekday, PeakWindow>,
    pub options: Vec<BookingOption>,
}

impl Venue {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let venue = Self::from_json_str(&raw)?;
        info!(
            "loaded venue from {}: {} option(s), open {}",
            path.display(),
            venue.options.len(),
            venue.opening_hours
        );
        Ok(venue)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let venue: Venue = serde_json::from_str(raw)?;
        venue.check()?;
        Ok(venue)
    }

    /// Check every invariant the engine relies on.
    pub fn check(&self) -> Result<(), ConfigError> {
        let h = self.opening_hours;
        if h.open < MIN_HOUR || h.close > MAX_HOUR || h.open >= h.close {
            return Err(ConfigError::InvalidOpeningHours(h));
        }
        for (&day, &window) in &self.peak_times {
            if window.start > window.end || window.start < MIN_HOUR || window.end > MAX_HOUR {
                return Err(ConfigError::InvalidPeakWindow { day, window });
            }
        }
        if self.options.len() > MAX_OPTIONS {
            return Err(ConfigError::LimitExceeded("too many booking options"));
        }

        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.id.as_str()) {
                return Err(ConfigError::DuplicateOption(option.id.clone()));
            }
            if option.rules.len() > MAX_RULES_PER_OPTION {
                return Err(ConfigError::LimitExceeded("too many rules in booking option"));
            }
            for rule in &option.rules {
                if rule.id.len() > MAX_RULE_ID_LEN {
                    return Err(ConfigError::LimitExceeded("rule id too long"));
                }
                if let Some(reason) = rule.defect() {
                    return Err(ConfigError::InvalidRule {
                        option: option.id.clone(),
                        rule: rule.id.clone(),
                        reason,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn option(&self, id: &str) -> Result<&BookingOption, ConfigError> {
        self.options
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| ConfigError::UnknownOption(id.to_string()))
    }

    pub fn rule_context(&self, day: Weekday, days_ahead: Option<u32>) -> RuleContext {
        RuleContext {
            day,
            peak: self.peak_times.get(&day).copied(),
            days_ahead,
        }
    }

    /// Everything needed to validate slots of `option` on `day`.
    pub fn day_plan<'a>(
        &'a self,
        option: &'a BookingOption,
        day: Weekday,
        days_ahead: Option<u32>,
        existing: &'a [ExistingBooking],
    ) -> Result<DayPlan<'a>, ConfigError> {
        if !option.is_available_on(day) {
            return Err(ConfigError::UnavailableDay {
                option: option.id.clone(),
                day,
            });
        }
        check_bookings(existing)?;
        Ok(DayPlan {
            opening: self.opening_hours,
            existing,
            rules: &option.rules,
            ctx: self.rule_context(day, days_ahead),
        })
    }
}

/// The inputs of one validation day for one booking option.
#[derive(Debug, Clone, Copy)]
pub struct DayPlan<'a> {
    pub opening: OpeningHours,
    pub existing: &'a [ExistingBooking],
    pub rules: &'a [BookingRule],
    pub ctx: RuleContext,
}

impl<'a> DayPlan<'a> {
    /// Rules that apply to `slot` on this day.
    pub fn rules_for(&self, slot: CandidateSlot) -> Vec<&'a BookingRule> {
        applicable_rules_in(self.rules, &self.ctx, slot)
    }

    pub fn validate(&self, slot: CandidateSlot, phase: Phase) -> Result<(), ValidationError> {
        engine::validate(self.opening, self.existing, self.rules_for(slot), slot, phase)
    }

    /// The existing booking that takes `hour`, if any.
    pub fn booking_at(&self, hour: Hour) -> Option<&'a ExistingBooking> {
        self.existing.iter().find(|b| b.is_busy_at(hour))
    }

}

/// Read the bookings of one day from a JSON list.
pub fn load_bookings(path: impl AsRef<Path>) -> Result<Vec<ExistingBooking>, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let bookings: Vec<ExistingBooking> = serde_json::from_str(&raw)?;
    check_bookings(&bookings)?;
    Ok(bookings)
}

fn check_bookings(bookings: &[ExistingBooking]) -> Result<(), ConfigError> {
    if bookings.len() > MAX_EXISTING_BOOKINGS {
        return Err(ConfigError::LimitExceeded("too many bookings on one day"));
    }
    if let Some(b) = bookings
        .iter()
        .find(|b| b.from >= b.until || b.from < MIN_HOUR || b.until > MAX_HOUR)
    {
        return Err(ConfigError::InvalidBooking {
            from: b.from,
            until: b.until,
        });
    }

    // The distance checks add up booked minutes and assume disjoint bookings.
    let mut sorted: Vec<&ExistingBooking> = bookings.iter().collect();
    sorted.sort_by_key(|b| (b.from, b.until));
    match sorted.windows(2).find(|pair| pair[1].from < pair[0].until) {
        Some(pair) => Err(ConfigError::OverlappingBookings(pair[0].id, pair[1].id)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "openingHours": [10, 24],
        "peakTimes": {
            "mon": [17, 24],
            "sat": [14, 23]
        },
        "options": [
            {
                "id": "standard",
                "title": "Rehearsal",
                "availableDays": ["mon", "tue", "wed", "thu", "fri", "sat", "sun"],
                "price": 5,
                "peakPrice": 10,
                "rules": [
                    {
                        "id": "1",
                        "days": ["mon", "tue", "wed", "thu", "fri", "sat", "sun"],
                        "allDay": true,
                        "minLength": 180,
                        "allowFillSlots": true,
                        "minDistanceBetweenSlots": 120
                    }
                ]
            },
            {
                "id": "weekday",
                "title": "Weekday session",
                "availableDays": ["mon", "tue"],
                "rules": []
            }
        ]
    }"#;

    #[test]
    fn parses_catalog() {
        let venue = Venue::from_json_str(CATALOG).unwrap();
        assert_eq!(venue.opening_hours, OpeningHours::new(10, 24));
        assert_eq!(venue.options.len(), 2);
        assert_eq!(venue.peak_times[&Weekday::Sat], PeakWindow::new(14, 23));
        let standard = venue.option("standard").unwrap();
        assert_eq!(standard.rules[0].min_length, Some(180));
    }

    #[test]
    fn unknown_option() {
        let venue = Venue::from_json_str(CATALOG).unwrap();
        assert!(matches!(venue.option("nope"), Err(ConfigError::UnknownOption(_))));
    }

    #[test]
    fn rejects_rule_missing_min_length() {
        let raw = CATALOG.replace("\"minLength\": 180,", "\"bookingInterval\": 240,");
        let err = Venue::from_json_str(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRule { ref rule, .. } if rule == "1"));
        assert_eq!(
            err.to_string(),
            "invalid rule 1 in option standard: bookingInterval needs minLength"
        );
    }

    #[test]
    fn rejects_inverted_opening_hours() {
        let raw = CATALOG.replace("[10, 24]", "[18, 10]");
        assert!(matches!(
            Venue::from_json_str(&raw),
            Err(ConfigError::InvalidOpeningHours(_))
        ));
    }

    #[test]
    fn rejects_duplicate_option_ids() {
        let raw = CATALOG.replace("\"id\": \"weekday\"", "\"id\": \"standard\"");
        assert!(matches!(
            Venue::from_json_str(&raw),
            Err(ConfigError::DuplicateOption(_))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(Venue::from_json_str("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn day_plan_requires_available_day() {
        let venue = Venue::from_json_str(CATALOG).unwrap();
        let weekday = venue.option("weekday").unwrap();
        assert!(venue.day_plan(weekday, Weekday::Mon, None, &[]).is_ok());
        assert!(matches!(
            venue.day_plan(weekday, Weekday::Sun, None, &[]),
            Err(ConfigError::UnavailableDay { .. })
        ));
    }

    #[test]
    fn day_plan_carries_peak_window() {
        let venue = Venue::from_json_str(CATALOG).unwrap();
        let standard = venue.option("standard").unwrap();
        let plan = venue.day_plan(standard, Weekday::Mon, Some(4), &[]).unwrap();
        assert_eq!(plan.ctx.peak, Some(PeakWindow::new(17, 24)));
        assert_eq!(plan.ctx.days_ahead, Some(4));
        let plan = venue.day_plan(standard, Weekday::Tue, None, &[]).unwrap();
        assert_eq!(plan.ctx.peak, None);
    }

    #[test]
    fn day_plan_validates_with_applicable_rules() {
        let venue = Venue::from_json_str(CATALOG).unwrap();
        let standard = venue.option("standard").unwrap();
        let existing = vec![ExistingBooking::new(12, 15), ExistingBooking::new(17, 20)];
        let plan = venue.day_plan(standard, Weekday::Wed, None, &existing).unwrap();

        assert_eq!(plan.booking_at(12), Some(&existing[0]));
        assert_eq!(plan.booking_at(15), None);
        // Exactly fills the two free hours between the bookings.
        assert!(plan.validate(CandidateSlot::new(15, 16), Phase::Final).is_ok());
        assert_eq!(
            plan.validate(CandidateSlot::new(20, 21), Phase::Final)
                .unwrap_err()
                .to_string(),
            "You have to book at least 3 hours or fill the entire spot"
        );
    }

    fn test_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("slotguard_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn loads_venue_and_bookings_from_files() {
        let venue_path = test_path("venue.json");
        std::fs::write(&venue_path, CATALOG).unwrap();
        let venue = Venue::load(&venue_path).unwrap();
        assert_eq!(venue.options[0].id, "standard");

        let bookings_path = test_path("bookings.json");
        std::fs::write(
            &bookings_path,
            r#"[{"id": "01ARZ3NDEKTSV4RRFFQ69G5FAV", "from": 12, "until": 15}]"#,
        )
        .unwrap();
        let bookings = load_bookings(&bookings_path).unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].span(), Span::new(12, 15));
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = test_path("missing.json");
        assert!(matches!(Venue::load(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn day_plan_rejects_inverted_booking() {
        let venue = Venue::from_json_str(CATALOG).unwrap();
        let standard = venue.option("standard").unwrap();
        let existing = vec![ExistingBooking {
            id: Ulid::new(),
            from: 15,
            until: 12,
        }];
        assert!(matches!(
            venue.day_plan(standard, Weekday::Wed, None, &existing),
            Err(ConfigError::InvalidBooking { from: 15, until: 12 })
        ));
    }

    #[test]
    fn day_plan_rejects_overlapping_bookings() {
        let venue = Venue::from_json_str(CATALOG).unwrap();
        let standard = venue.option("standard").unwrap();

        let twice = vec![ExistingBooking::new(10, 11), ExistingBooking::new(10, 11)];
        assert!(matches!(
            venue.day_plan(standard, Weekday::Wed, None, &twice),
            Err(ConfigError::OverlappingBookings(..))
        ));

        // Unsorted input is checked in hour order.
        let late = ExistingBooking::new(16, 19);
        let early = ExistingBooking::new(12, 17);
        let crossing = vec![late.clone(), early.clone()];
        let err = venue
            .day_plan(standard, Weekday::Wed, None, &crossing)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OverlappingBookings(a, b) if a == early.id && b == late.id
        ));
    }

    #[test]
    fn adjacent_bookings_are_not_overlapping() {
        let venue = Venue::from_json_str(CATALOG).unwrap();
        let standard = venue.option("standard").unwrap();
        let existing = vec![ExistingBooking::new(15, 17), ExistingBooking::new(12, 15)];
        assert!(venue.day_plan(standard, Weekday::Wed, None, &existing).is_ok());
    }

    #[test]
    fn day_plan_rejects_booking_past_midnight() {
        let venue = Venue::from_json_str(CATALOG).unwrap();
        let standard = venue.option("standard").unwrap();
        let existing = vec![ExistingBooking::new(22, 25)];
        assert!(matches!(
            venue.day_plan(standard, Weekday::Wed, None, &existing),
            Err(ConfigError::InvalidBooking { from: 22, until: 25 })
        ));
    }

    #[test]
    fn rejects_inverted_peak_window() {
        let raw = CATALOG.replace("\"sat\": [14, 23]", "\"sat\": [20, 18]");
        let err = Venue::from_json_str(&raw).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPeakWindow {
                day: Weekday::Sat,
                window: PeakWindow { start: 20, end: 18 },
            }
        ));
        assert_eq!(err.to_string(), "invalid peak window on sat: 20 - 18");
    }

    fn empty_option(id: String) -> BookingOption {
        BookingOption {
            id,
            title: "Room".into(),
            description: None,
            available_days: Weekday::ALL.to_vec(),
            rules: Vec::new(),
        }
    }

    fn venue_with(options: Vec<BookingOption>) -> Venue {
        Venue {
            opening_hours: OpeningHours::new(10, 24),
            peak_times: HashMap::new(),
            options,
        }
    }

    #[test]
    fn rejects_too_many_options() {
        let options = (0..=MAX_OPTIONS).map(|i| empty_option(format!("o{i}"))).collect();
        let err = venue_with(options).check().unwrap_err();
        assert_eq!(err.to_string(), "limit exceeded: too many booking options");
    }

    #[test]
    fn rejects_too_many_rules() {
        let mut option = empty_option("busy".into());
        option.rules = (0..=MAX_RULES_PER_OPTION)
            .map(|i| BookingRule::all_day(format!("r{i}"), &[Weekday::Mon]))
            .collect();
        let err = venue_with(vec![option]).check().unwrap_err();
        assert_eq!(err.to_string(), "limit exceeded: too many rules in booking option");
    }

    #[test]
    fn rejects_long_rule_id() {
        let mut option = empty_option("room".into());
        option.rules = vec![BookingRule::all_day(
            "x".repeat(MAX_RULE_ID_LEN + 1),
            &[Weekday::Mon],
        )];
        let err = venue_with(vec![option]).check().unwrap_err();
        assert_eq!(err.to_string(), "limit exceeded: rule id too long");
    }

    #[test]
    fn rejects_too_many_bookings() {
        let venue = Venue::from_json_str(CATALOG).unwrap();
        let standard = venue.option("standard").unwrap();
        let existing: Vec<ExistingBooking> = (0..=MAX_EXISTING_BOOKINGS)
            .map(|_| ExistingBooking::new(10, 11))
            .collect();
        assert!(matches!(
            venue.day_plan(standard, Weekday::Wed, None, &existing),
            Err(ConfigError::LimitExceeded("too many bookings on one day"))
        ));
    }
}
