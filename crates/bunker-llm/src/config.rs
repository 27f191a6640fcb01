//! Provider configuration
//!
//! Read once at startup from the environment.

use serde::{Deserialize, Serialize};
use std::env;

/// Generation provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider kind: "openai" or "mock" (env: BUNKER_LLM_PROVIDER)
    pub provider: String,
    /// Endpoint root (env: BUNKER_LLM_BASE_URL)
    pub base_url: String,
    /// Bearer token (env: BUNKER_LLM_API_KEY)
    pub api_key: Option<String>,
    /// Model name (env: BUNKER_LLM_MODEL)
    pub model: String,
    /// Retries for transient failures (env: BUNKER_LLM_RETRIES)
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_retries: 2,
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: env::var("BUNKER_LLM_PROVIDER").unwrap_or(defaults.provider),
            base_url: env::var("BUNKER_LLM_BASE_URL").unwrap_or(defaults.base_url),
            api_key: env::var("BUNKER_LLM_API_KEY").ok().filter(|k| !k.is_empty()),
            model: env::var("BUNKER_LLM_MODEL").unwrap_or(defaults.model),
            max_retries: env::var("BUNKER_LLM_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }

    /// Whether a real endpoint is configured
    pub fn is_remote(&self) -> bool {
        self.provider.eq_ignore_ascii_case("openai")
    }
}
