//! Core domain layer. No external I/O dependencies.
//!
//! Time slots, courses, the conflict check and the error type live here.

pub mod conflict;
pub mod course;
pub mod entities;
pub mod errors;
pub mod timeslot;

pub use conflict::{Conflict, check_conflict};
pub use course::{Course, CourseArea, Timetable};
pub use entities::{ChatRole, ChatTurn, CreditReport, KnowledgeBase, LlmPrompt};
pub use errors::DomainError;
pub use timeslot::{Period, SlotSet, TimeSlot, Weekday};
