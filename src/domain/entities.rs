//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/IO types here; adapters map into these.

use serde::{Deserialize, Serialize};

/// Concatenated handbook text used as LLM context.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    pub content: String,
    /// File names of the documents that made up `content`.
    pub documents: Vec<String>,
}

impl KnowledgeBase {
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// A single prompt sent to the LLM.
#[derive(Debug, Clone)]
pub struct LlmPrompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry of the Q&A conversation shown in the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Graduation credit progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditReport {
    pub major: u32,
    pub general: u32,
    pub total: u32,
    pub required: u32,
    pub remaining: u32,
    /// `total / required`, capped at 1.0.
    pub progress: f64,
}

impl CreditReport {
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}
