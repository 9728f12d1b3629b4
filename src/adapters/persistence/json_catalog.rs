//! Implements CatalogPort. Reads `courses.json`, or serves the built-in offering list.

use crate::domain::{Course, CourseArea, DomainError, SlotSet};
use crate::ports::CatalogPort;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Sample offerings used when no catalog file exists.
    pub fn builtin() -> Result<Vec<Course>, DomainError> {
        let rows: [(&str, &str, &str, CourseArea, u8, u8, bool); 5] = [
            ("인공지능기초", "김교수", "월1,2,3", CourseArea::Major, 40, 60, true),
            ("전자회로1", "이교수", "화4,5,6", CourseArea::Major, 20, 80, false),
            ("데이터베이스", "최교수", "목4,5,6", CourseArea::Major, 30, 70, true),
            ("광운인성", "정교수", "금1,2", CourseArea::General, 10, 90, false),
            ("대학영어", "Brown", "월7,8", CourseArea::General, 30, 70, true),
        ];
        rows.into_iter()
            .map(|(name, professor, time, area, assignment, exam, team)| {
                Ok(Course {
                    name: name.to_string(),
                    professor: Some(professor.to_string()),
                    slots: SlotSet::parse(time)?,
                    area: Some(area),
                    assignment_weight: Some(assignment),
                    exam_weight: Some(exam),
                    team_project: Some(team),
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl CatalogPort for JsonCatalog {
    async fn courses(&self) -> Result<Vec<Course>, DomainError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no course catalog file, using built-in list");
                return Self::builtin();
            }
            Err(e) => return Err(DomainError::Catalog(e.to_string())),
        };
        let courses: Vec<Course> = serde_json::from_str(&raw)
            .map_err(|e| DomainError::Catalog(format!("{}: {}", self.path.display(), e)))?;
        info!(path = %self.path.display(), count = courses.len(), "loaded course catalog");
        Ok(courses)
    }
}
