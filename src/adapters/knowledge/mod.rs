//! Knowledge adapters. Load handbook text for the advisor.

pub mod text_loader;

pub use text_loader::TextKnowledgeLoader;
