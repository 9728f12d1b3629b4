//! AI adapter module. Implements LlmPort for LLM integration.
//!
//! Provides the Gemini REST adapter and a mock adapter for running offline.

pub mod gemini_adapter;
pub mod mock_adapter;

pub use gemini_adapter::GeminiAdapter;
pub use mock_adapter::MockLlmAdapter;
