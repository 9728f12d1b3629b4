//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{Course, DomainError, KnowledgeBase, LlmPrompt, Timetable};

/// Hosted LLM. Adapters classify quota and overload responses as
/// `DomainError::RateLimited` / `DomainError::Unavailable` so callers can retry.
#[async_trait::async_trait]
pub trait LlmPort: Send + Sync {
    /// Send a prompt and return the model's text answer.
    async fn generate(&self, prompt: &LlmPrompt) -> Result<String, DomainError>;
}

/// Source of handbook text used as Q&A context.
#[async_trait::async_trait]
pub trait KnowledgePort: Send + Sync {
    /// Load all available documents. An empty knowledge base is not an error.
    async fn load(&self) -> Result<KnowledgeBase, DomainError>;
}

/// Course offerings the student can pick from.
#[async_trait::async_trait]
pub trait CatalogPort: Send + Sync {
    async fn courses(&self) -> Result<Vec<Course>, DomainError>;
}

/// Persistence for the user's selected timetable.
#[async_trait::async_trait]
pub trait TimetableStorePort: Send + Sync {
    /// Returns an empty timetable when nothing was saved yet.
    async fn load(&self) -> Result<Timetable, DomainError>;

    async fn save(&self, timetable: &Timetable) -> Result<(), DomainError>;
}
