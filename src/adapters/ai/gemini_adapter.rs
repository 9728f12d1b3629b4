//! Gemini REST adapter (`models/{model}:generateContent`).
//!
//! Quota and overload responses map onto the transient `DomainError` variants.

use crate::domain::{DomainError, LlmPrompt};
use crate::ports::LlmPort;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Google AI Studio / Vertex-compatible Gemini adapter.
pub struct GeminiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GeminiAdapter {
    /// Create a new Gemini adapter.
    ///
    /// # Arguments
    /// * `api_url` - REST base (e.g., "https://generativelanguage.googleapis.com/v1beta")
    /// * `api_key` - API key sent as `x-goog-api-key`
    /// * `model` - Model name (e.g., "gemini-1.5-flash-latest")
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Map a non-success HTTP response to a domain error.
    ///
    /// 429 and `RESOURCE_EXHAUSTED` are rate limits; 503 and `UNAVAILABLE` are
    /// temporary outages. Everything else is a plain AI failure.
    fn classify_failure(status: u16, body: &str) -> DomainError {
        let api_status = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|e| e.error.status);
        let detail = format!(
            "API error {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        );

        match (status, api_status.as_deref()) {
            (429, _) | (_, Some("RESOURCE_EXHAUSTED")) => DomainError::RateLimited(detail),
            (503, _) | (_, Some("UNAVAILABLE")) => DomainError::Unavailable(detail),
            _ => DomainError::Ai(detail),
        }
    }

    /// Join the text parts of the first candidate.
    fn extract_text(response: GenerateResponse) -> Result<String, DomainError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Ai("No candidates returned".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
            return Err(DomainError::Ai(format!(
                "Empty answer (finish reason: {})",
                reason
            )));
        }
        Ok(text.trim().to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    status: Option<String>,
}

#[async_trait::async_trait]
impl LlmPort for GeminiAdapter {
    async fn generate(&self, prompt: &LlmPrompt) -> Result<String, DomainError> {
        info!(
            model = %self.model,
            system_len = prompt.system.len(),
            user_len = prompt.user.len(),
            "sending prompt to Gemini"
        );

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(prompt.system.clone()),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.user.clone()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: prompt.temperature,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    DomainError::Unavailable(format!("HTTP request failed: {}", e))
                } else {
                    DomainError::Ai(format!("HTTP request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                body = %text.chars().take(200).collect::<String>(),
                "Gemini API returned error"
            );
            return Err(Self::classify_failure(status.as_u16(), &text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Ai(format!("Failed to parse API response: {}", e)))?;

        let answer = Self::extract_text(parsed)?;
        debug!(answer_len = answer.len(), "received Gemini answer");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert!(matches!(
            GeminiAdapter::classify_failure(429, body),
            DomainError::RateLimited(_)
        ));
        // some proxies rewrite the status code but keep the body
        assert!(matches!(
            GeminiAdapter::classify_failure(400, body),
            DomainError::RateLimited(_)
        ));
    }

    #[test]
    fn test_classify_unavailable() {
        let body = r#"{"error":{"code":503,"message":"overloaded","status":"UNAVAILABLE"}}"#;
        assert!(GeminiAdapter::classify_failure(503, body).is_transient());
        assert!(matches!(
            GeminiAdapter::classify_failure(503, "<html>"),
            DomainError::Unavailable(_)
        ));
    }

    #[test]
    fn test_classify_fatal() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let err = GeminiAdapter::classify_failure(400, body);
        assert!(!err.is_transient());
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"장학금은 "},{"text":"3.5 이상"}]},"finishReason":"STOP"}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(GeminiAdapter::extract_text(parsed).unwrap(), "장학금은 3.5 이상");
    }

    #[test]
    fn test_extract_text_blocked() {
        let json = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        let err = GeminiAdapter::extract_text(parsed).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some("sys".into()),
                }],
            },
            contents: vec![],
            generation_config: GenerationConfig { temperature: 0.0 },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("systemInstruction").is_some());
        assert!(value.get("generationConfig").is_some());
        assert!(value["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let adapter = GeminiAdapter::new(
            "https://example.test/v1beta/".into(),
            "k".into(),
            "gemini-pro".into(),
        );
        assert_eq!(
            adapter.endpoint(),
            "https://example.test/v1beta/models/gemini-pro:generateContent"
        );
    }
}
