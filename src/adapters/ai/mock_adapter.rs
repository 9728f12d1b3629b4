//! Mock LLM adapter for running without an API key.
//!
//! Returns canned answers and simulates network latency.

use crate::domain::{DomainError, LlmPrompt};
use crate::ports::LlmPort;
use std::time::Duration;
use tracing::info;

/// Mock LLM adapter.
pub struct MockLlmAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockLlmAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Default for MockLlmAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmPort for MockLlmAdapter {
    async fn generate(&self, prompt: &LlmPrompt) -> Result<String, DomainError> {
        info!(
            user_len = prompt.user.len(),
            "[MOCK] Simulating LLM answer"
        );

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        Ok(format!(
            "[MOCK] {}자 분량의 질문 프롬프트를 받았습니다. \
             실제 답변을 받으려면 GOOGLE_API_KEY를 설정하세요.",
            prompt.user.chars().count()
        ))
    }
}
