use tracing::debug;

use crate::config::DayPlan;
use crate::engine::ValidationError;
use crate::model::*;
use crate::observability;

/// Where a selection stands after the last interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    Empty,
    /// The current marks passed tentative validation.
    Valid,
    /// The last click or confirmation was rejected; marks are unchanged.
    Invalid(ValidationError),
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    Empty,
    Invalid(ValidationError),
    AlreadyConfirmed,
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionError::Empty => write!(f, "nothing selected"),
            SelectionError::Invalid(e) => write!(f, "{e}"),
            SelectionError::AlreadyConfirmed => write!(f, "selection already confirmed"),
        }
    }
}

impl std::error::Error for SelectionError {}

/// How a click changed the selected marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Start,
    Extend,
    Truncate,
    Restart,
    Clear,
}

impl Transition {
    fn label(&self) -> &'static str {
        match self {
            Transition::Start => "start",
            Transition::Extend => "extend",
            Transition::Truncate => "truncate",
            Transition::Restart => "restart",
            Transition::Clear => "clear",
        }
    }
}

/// Click-driven hour selection for one booking day.
///
/// Every click re-derives the candidate slot from the selected marks and
/// validates it tentatively; `confirm` runs the final check. Rejected clicks
/// leave the previously accepted marks in place.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    plan: DayPlan<'a>,
    marks: Vec<Hour>,
    state: SelectionState,
}

impl<'a> Selection<'a> {
    pub fn new(plan: DayPlan<'a>) -> Self {
        Self {
            plan,
            marks: Vec::new(),
            state: SelectionState::Empty,
        }
    }

    pub fn marks(&self) -> &[Hour] {
        &self.marks
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// The committed selection as a slot, if any marks are selected.
    pub fn slot(&self) -> Option<CandidateSlot> {
        match (self.marks.first(), self.marks.last()) {
            (Some(&start), Some(&end)) => Some(CandidateSlot::new(start, end)),
            _ => None,
        }
    }

    /// Apply a click on `mark` and validate the resulting selection.
    ///
    /// Booked hours cannot be selected: clicking one is rejected as an
    /// overlap and the marks stay as they were.
    pub fn click(&mut self, mark: Hour) -> &SelectionState {
        if let Some(booking) = self.plan.booking_at(mark) {
            metrics::counter!(
                observability::SELECTION_CLICKS_TOTAL,
                "transition" => "busy"
            )
            .increment(1);
            debug!(mark, booking = %booking.id, "click on booked hour");
            self.state = SelectionState::Invalid(ValidationError::Overlap {
                booking: booking.id,
                slot: CandidateSlot::single(mark),
            });
            return &self.state;
        }

        let (transition, marks) = self.next_marks(mark);
        metrics::counter!(
            observability::SELECTION_CLICKS_TOTAL,
            "transition" => transition.label()
        )
        .increment(1);

        if transition == Transition::Clear {
            self.marks.clear();
            self.state = SelectionState::Empty;
            return &self.state;
        }

        let slot = CandidateSlot::new(marks[0], marks[marks.len() - 1]);
        debug!(mark, transition = transition.label(), %slot, "selection click");
        match self.plan.validate(slot, Phase::Tentative) {
            Ok(()) => {
                self.marks = marks;
                self.state = SelectionState::Valid;
            }
            Err(e) => self.state = SelectionState::Invalid(e),
        }
        &self.state
    }

    /// Run the final check on the committed marks.
    pub fn confirm(&mut self) -> Result<CandidateSlot, SelectionError> {
        let result = self.try_confirm();
        metrics::counter!(
            observability::CONFIRMATIONS_TOTAL,
            "outcome" => if result.is_ok() { "ok" } else { "rejected" }
        )
        .increment(1);
        result
    }

    fn try_confirm(&mut self) -> Result<CandidateSlot, SelectionError> {
        match &self.state {
            SelectionState::Empty => return Err(SelectionError::Empty),
            SelectionState::Confirmed => return Err(SelectionError::AlreadyConfirmed),
            SelectionState::Invalid(e) => return Err(SelectionError::Invalid(e.clone())),
            SelectionState::Valid => {}
        }
        let slot = self.slot().ok_or(SelectionError::Empty)?;
        match self.plan.validate(slot, Phase::Final) {
            Ok(()) => {
                self.state = SelectionState::Confirmed;
                Ok(slot)
            }
            Err(e) => {
                self.state = SelectionState::Invalid(e.clone());
                Err(SelectionError::Invalid(e))
            }
        }
    }

    /// Start over with nothing selected.
    pub fn reset(&mut self) {
        self.marks.clear();
        self.state = SelectionState::Empty;
    }

    fn next_marks(&self, mark: Hour) -> (Transition, Vec<Hour>) {
        let Some(&first) = self.marks.first() else {
            return (Transition::Start, vec![mark]);
        };
        if let Some(idx) = self.marks.iter().position(|&m| m == mark) {
            if self.marks.len() == 1 {
                return (Transition::Clear, Vec::new());
            }
            return (Transition::Truncate, self.marks[..=idx].to_vec());
        }
        if mark < first {
            return (Transition::Restart, vec![mark]);
        }
        (Transition::Extend, (first..=mark).collect())
    }
}
