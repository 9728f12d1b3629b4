//! Application configuration. API credentials, paths, retry policy.

use crate::shared::retry::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
use serde::Deserialize;
use std::time::Duration;

/// Credits needed to graduate.
pub const DEFAULT_REQUIRED_CREDITS: u32 = 130;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding handbook text, `courses.json` and the saved timetable. Read from KW_MASTER_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Gemini
    // ─────────────────────────────────────────────────────────────────────────
    /// Gemini API key. Read from KW_MASTER_GEMINI_API_KEY, falls back to GOOGLE_API_KEY.
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Model name. Defaults to DEFAULT_GEMINI_MODEL. Read from KW_MASTER_GEMINI_MODEL.
    #[serde(default)]
    pub gemini_model: Option<String>,

    /// REST base URL. Read from KW_MASTER_GEMINI_API_URL.
    #[serde(default)]
    pub gemini_api_url: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Retry (rate-limited AI calls)
    // ─────────────────────────────────────────────────────────────────────────
    /// First backoff delay in ms (default 1000). Read from KW_MASTER_RETRY_BASE_DELAY_MS.
    #[serde(default)]
    pub retry_base_delay_ms: Option<u64>,

    /// Growth factor between delays (default 2). Read from KW_MASTER_RETRY_MULTIPLIER.
    #[serde(default)]
    pub retry_multiplier: Option<u32>,

    /// Attempts including the first call (default 5). Read from KW_MASTER_RETRY_MAX_ATTEMPTS.
    #[serde(default)]
    pub retry_max_attempts: Option<u32>,

    /// Credits required for graduation (default 130). Read from KW_MASTER_REQUIRED_CREDITS.
    #[serde(default)]
    pub required_credits: Option<u32>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("KW_MASTER").try_parsing(true));
        if let Ok(path) = std::env::var("KW_MASTER_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let cfg: Self = c.build()?.try_deserialize()?;
        Ok(cfg.with_fallback_key(std::env::var("GOOGLE_API_KEY").ok()))
    }

    /// Use `fallback` (GOOGLE_API_KEY) when the prefixed key is unset or blank.
    fn with_fallback_key(mut self, fallback: Option<String>) -> Self {
        if self.gemini_api_key().is_none() {
            self.gemini_api_key = fallback.filter(|k| !k.trim().is_empty());
        }
        self
    }

    /// Returns the data directory. Defaults to "./data".
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    /// Returns the Gemini API key if configured and non-empty.
    pub fn gemini_api_key(&self) -> Option<String> {
        self.gemini_api_key.clone().filter(|k| !k.trim().is_empty())
    }

    pub fn gemini_model_or_default(&self) -> String {
        self.gemini_model
            .clone()
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string())
    }

    pub fn gemini_api_url_or_default(&self) -> String {
        self.gemini_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string())
    }

    /// Returns true if a real LLM can be used (API key present).
    pub fn is_ai_configured(&self) -> bool {
        self.gemini_api_key().is_some()
    }

    /// Backoff policy for AI calls. Defaults reproduce the 1, 2, 4, 8, 16 s table.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(
            Duration::from_millis(self.retry_base_delay_ms.unwrap_or(1000)),
            self.retry_multiplier.unwrap_or(2),
            self.retry_max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
        )
    }

    pub fn required_credits_or_default(&self) -> u32 {
        self.required_credits
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_REQUIRED_CREDITS)
    }
}
