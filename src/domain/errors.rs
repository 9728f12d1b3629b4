//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use crate::shared::retry::RetryCancelled;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid time slot: {0}")]
    InvalidSlot(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    /// No handbook text was found under the data directory.
    #[error("Knowledge base is empty: put handbook text files into the data directory")]
    KnowledgeEmpty,

    #[error("Course catalog error: {0}")]
    Catalog(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("AI request failed: {0}")]
    Ai(String),

    /// Quota or rate limit hit (HTTP 429 / RESOURCE_EXHAUSTED). Retried with backoff.
    #[error("AI rate limited: {0}")]
    RateLimited(String),

    /// Upstream temporarily unavailable (HTTP 503 / UNAVAILABLE). Retried with backoff.
    #[error("AI temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error(transparent)]
    Cancelled(#[from] RetryCancelled),
}

impl DomainError {
    /// Transient failures are expected to clear up if the same call is repeated later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_variants() {
        assert!(DomainError::RateLimited("429".into()).is_transient());
        assert!(DomainError::Unavailable("503".into()).is_transient());
        assert!(!DomainError::Ai("400".into()).is_transient());
        assert!(!DomainError::KnowledgeEmpty.is_transient());
        assert!(!DomainError::from(RetryCancelled { attempts: 1 }).is_transient());
    }
}
