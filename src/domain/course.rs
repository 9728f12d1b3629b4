//! Course entities and the user's timetable selection.

use crate::domain::SlotSet;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseArea {
    #[serde(rename = "전공", alias = "major")]
    Major,
    #[serde(rename = "교양", alias = "general")]
    General,
}

impl fmt::Display for CourseArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseArea::Major => f.write_str("전공"),
            CourseArea::General => f.write_str("교양"),
        }
    }
}

/// A course offering. `name` is the identity used by the UI; conflicts are slot based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    #[serde(default)]
    pub professor: Option<String>,
    /// Compact slot string in JSON (`"월1,2,3"`). Empty for online courses.
    #[serde(rename = "time", default)]
    pub slots: SlotSet,
    #[serde(default)]
    pub area: Option<CourseArea>,
    /// Share of the grade from assignments, in percent.
    #[serde(default)]
    pub assignment_weight: Option<u8>,
    #[serde(default)]
    pub exam_weight: Option<u8>,
    #[serde(default)]
    pub team_project: Option<bool>,
}

impl Course {
    /// Bare candidate with only a name and slots.
    pub fn new(name: impl Into<String>, slots: SlotSet) -> Self {
        Self {
            name: name.into(),
            professor: None,
            slots,
            area: None,
            assignment_weight: None,
            exam_weight: None,
            team_project: None,
        }
    }
}

/// Courses the user has selected, in insertion order.
///
/// Overlap is detected by [`crate::domain::check_conflict`], never prevented here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    courses: Vec<Course>,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn contains(&self, name: &str) -> bool {
        self.courses.iter().any(|c| c.name == name)
    }

    pub fn push(&mut self, course: Course) {
        self.courses.push(course);
    }

    /// Removes the first course with this name. Returns it if present.
    pub fn remove(&mut self, name: &str) -> Option<Course> {
        let idx = self.courses.iter().position(|c| c.name == name)?;
        Some(self.courses.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
