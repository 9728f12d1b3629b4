//! Timetable building: pick courses from the catalog, detect slot conflicts, persist.
//!
//! The conflict check only reports; `force` lets the user keep an overlapping course.

use crate::domain::{Course, DomainError, TimeSlot, Timetable, check_conflict};
use crate::ports::{CatalogPort, TimetableStorePort};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Result of trying to add a course to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadySelected,
    /// Not added (unless forced): overlaps `with` on `shared`.
    Conflict { with: String, shared: Vec<TimeSlot> },
    /// Added despite overlapping `with`.
    ForcedOverlap { with: String, shared: Vec<TimeSlot> },
}

pub struct TimetableService {
    catalog: Arc<dyn CatalogPort>,
    store: Arc<dyn TimetableStorePort>,
    selected: RwLock<Timetable>,
}

impl TimetableService {
    pub fn new(catalog: Arc<dyn CatalogPort>, store: Arc<dyn TimetableStorePort>) -> Self {
        Self {
            catalog,
            store,
            selected: RwLock::new(Timetable::default()),
        }
    }

    /// Load the saved selection. Call once after construction.
    pub async fn load(&self) -> Result<(), DomainError> {
        let saved = self.store.load().await?;
        info!(courses = saved.len(), "timetable loaded");
        *self.selected.write().await = saved;
        Ok(())
    }

    pub async fn save(&self) -> Result<(), DomainError> {
        let selected = self.selected.read().await;
        self.store.save(&selected).await
    }

    pub async fn catalog(&self) -> Result<Vec<Course>, DomainError> {
        self.catalog.courses().await
    }

    pub async fn selected(&self) -> Timetable {
        self.selected.read().await.clone()
    }

    /// Add a catalog course by name. Conflicts are reported, and only stored when `force` is set.
    pub async fn add(&self, name: &str, force: bool) -> Result<AddOutcome, DomainError> {
        let course = self
            .catalog
            .courses()
            .await?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DomainError::Catalog(format!("no course named '{}'", name)))?;
        self.add_course(course, force).await
    }

    /// Add an arbitrary candidate (e.g. one the user typed in).
    pub async fn add_course(&self, course: Course, force: bool) -> Result<AddOutcome, DomainError> {
        let mut selected = self.selected.write().await;
        if selected.contains(&course.name) {
            return Ok(AddOutcome::AlreadySelected);
        }

        let conflict = check_conflict(&course.slots, selected.courses())
            .map(|c| (c.course.to_string(), c.shared));

        let outcome = match conflict {
            None => AddOutcome::Added,
            Some((with, shared)) if force => {
                warn!(course = %course.name, with = %with, "adding course despite slot overlap");
                AddOutcome::ForcedOverlap { with, shared }
            }
            Some((with, shared)) => {
                info!(course = %course.name, with = %with, "slot conflict, not added");
                return Ok(AddOutcome::Conflict { with, shared });
            }
        };

        info!(course = %course.name, slots = %course.slots, "course added");
        selected.push(course);
        Ok(outcome)
    }

    /// Remove a selected course. Returns false when it was not selected.
    pub async fn remove(&self, name: &str) -> bool {
        self.selected.write().await.remove(name).is_some()
    }

    pub async fn clear(&self) {
        *self.selected.write().await = Timetable::default();
    }
}
