//! Application use cases. Orchestrate domain logic via ports.

pub mod advisor_service;
pub mod credit_service;
pub mod timetable_service;

pub use advisor_service::AdvisorService;
pub use credit_service::CreditService;
pub use timetable_service::{AddOutcome, TimetableService};
