//! Slot conflict check between a candidate course and an existing selection.
//!
//! Pure and stateless: a single set comparison per selected course, no state machine.

use crate::domain::{Course, SlotSet, TimeSlot};

/// First selected course that shares a slot with the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict<'a> {
    pub course: &'a str,
    /// Slots both courses occupy.
    pub shared: Vec<TimeSlot>,
}

/// Checks `candidate` against `schedule` in insertion order.
///
/// Returns the first course whose slots intersect the candidate's. Only the first
/// collision is reported, so callers get "at least one", not "all". Unscheduled
/// candidates (empty slot set) never conflict. Names play no part.
pub fn check_conflict<'a>(candidate: &SlotSet, schedule: &'a [Course]) -> Option<Conflict<'a>> {
    if candidate.is_unscheduled() {
        return None;
    }
    schedule.iter().find_map(|existing| {
        let shared = candidate.shared_with(&existing.slots);
        (!shared.is_empty()).then(|| Conflict {
            course: existing.name.as_str(),
            shared,
        })
    })
}
