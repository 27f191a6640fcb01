//! Deadline-guarded generation
//!
//! Every call the game makes to a provider goes through a [`Generator`]. A
//! call either answers within the deadline or yields a fallback value; errors
//! never leave this module.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::json;
use crate::provider::{LlmError, LlmProvider, LlmRequest};

/// Response-or-fallback deadline applied to every generation call
pub const GENERATION_DEADLINE: Duration = Duration::from_secs(40);

#[derive(Debug, Clone)]
pub struct Generator {
    provider: Arc<dyn LlmProvider>,
    deadline: Duration,
}

impl Generator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            deadline: GENERATION_DEADLINE,
        }
    }

    /// Override the deadline for every call made through this generator
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Raw call with the deadline applied
    pub async fn try_generate(&self, request: LlmRequest) -> Result<String, LlmError> {
        match tokio::time::timeout(self.deadline, self.provider.complete(request)).await {
            Ok(Ok(response)) => Ok(response.content),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(LlmError::Timeout(self.deadline.as_millis() as u64)),
        }
    }

    /// Free text, trimmed; empty on failure
    pub async fn text(&self, request: LlmRequest) -> String {
        match self.try_generate(request).await {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                tracing::warn!(provider = %self.provider.name(), error = %e, "Generation failed, using fallback");
                String::new()
            }
        }
    }

    /// JSON object; empty map on failure or unparsable output
    pub async fn json(&self, request: LlmRequest) -> Map<String, Value> {
        let mut request = request;
        request.json_mode = true;
        match self.try_generate(request).await {
            Ok(content) => json::parse_object(&content),
            Err(e) => {
                tracing::warn!(provider = %self.provider.name(), error = %e, "JSON generation failed, using fallback");
                Map::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;

    #[tokio::test]
    async fn test_text_fallback_on_error() {
        let generator = Generator::new(Arc::new(MockProvider::failing()));
        assert_eq!(generator.text(LlmRequest::with_role("s", "p")).await, "");
    }

    #[tokio::test]
    async fn test_json_fallback_on_garbage() {
        let generator = Generator::new(Arc::new(MockProvider::constant("not json at all")));
        assert!(generator.json(LlmRequest::json("s", "p")).await.is_empty());
    }

    #[tokio::test]
    async fn test_json_parses_fenced_output() {
        let generator = Generator::new(Arc::new(MockProvider::constant(
            "```json\n{\"target\": \"Mira\"}\n```",
        )));
        let map = generator.json(LlmRequest::json("s", "p")).await;
        assert_eq!(json::str_field(&map, "target"), Some("Mira"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_enforced() {
        let slow = MockProvider::constant("too late").with_latency(Duration::from_secs(120));
        let generator = Generator::new(Arc::new(slow));

        let result = generator.try_generate(LlmRequest::with_role("s", "p")).await;
        assert!(matches!(result, Err(LlmError::Timeout(_))));
        assert_eq!(generator.text(LlmRequest::with_role("s", "p")).await, "");
    }
}
