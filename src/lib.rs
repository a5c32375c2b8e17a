pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod selection;

pub use engine::{ValidationError, applicable_rules, applicable_rules_in, validate};
pub use model::{BookingRule, CandidateSlot, ExistingBooking, OpeningHours, Phase, Weekday};
