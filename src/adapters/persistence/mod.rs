//! Filesystem persistence: course catalog and the saved timetable.

pub mod json_catalog;
pub mod timetable_json;

pub use json_catalog::JsonCatalog;
pub use timetable_json::TimetableJson;
