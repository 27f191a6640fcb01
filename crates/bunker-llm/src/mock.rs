//! Mock provider for tests and offline play

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};

/// How the mock produces content
#[derive(Debug)]
enum Behavior {
    /// Cycle through canned responses
    Canned(Vec<String>),
    /// First rule whose needle occurs in the prompt wins; otherwise the fallback
    Scripted {
        rules: Vec<(String, String)>,
        fallback: String,
    },
    /// Offline table talk, shaped by request kind
    Tabletop,
    /// Every call fails
    Failing,
}

/// A mock provider with predefined behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Name of this mock
    pub name: String,
    behavior: Behavior,
    calls: AtomicUsize,
    /// Simulated latency
    latency: Duration,
}

impl MockProvider {
    fn with_behavior(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    /// Cycle through the given responses
    pub fn new(responses: Vec<String>) -> Self {
        Self::with_behavior("mock", Behavior::Canned(responses))
    }

    /// Always return the same response
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Answer by prompt content; see [`MockProvider::rule`]
    pub fn scripted(fallback: &str) -> Self {
        Self::with_behavior(
            "scripted-mock",
            Behavior::Scripted {
                rules: Vec::new(),
                fallback: fallback.to_string(),
            },
        )
    }

    /// Add a rule: prompts containing `needle` get `response`
    pub fn rule(mut self, needle: &str, response: &str) -> Self {
        if let Behavior::Scripted { rules, .. } = &mut self.behavior {
            rules.push((needle.to_string(), response.to_string()));
        }
        self
    }

    /// Plausible offline answers for every decision kind
    pub fn tabletop() -> Self {
        Self::with_behavior("tabletop-mock", Behavior::Tabletop)
    }

    /// Every call fails with a connection error
    pub fn failing() -> Self {
        Self::with_behavior("failing-mock", Behavior::Failing)
    }

    /// Simulate provider latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of completions requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tabletop_response(&self, request: &LlmRequest, n: usize) -> String {
        let prompt = request.prompt.to_lowercase();

        if request.json_mode && prompt.contains("\"violation\"") {
            let tags = ["none", "passive", "none", "weird", "none", "liar"];
            let qualities = ["weak", "strong", "bad", "weak"];
            return format!(
                "{{\"violation\": \"{}\", \"argument_quality\": \"{}\", \"commentary\": \"Noted.\"}}",
                tags[n % tags.len()],
                qualities[n % qualities.len()]
            );
        }
        if request.json_mode && prompt.contains("\"topics\"") {
            return "{\"catastrophe\": \"A meteor shower has torched the surface.\", \
                    \"topics\": [\"Who wastes the water?\", \"Who lied about their skills?\"]}"
                .to_string();
        }
        if request.json_mode {
            // vote requests: defer to the caller's threat ranking
            return "{}".to_string();
        }
        if prompt.contains("director") {
            return "Press the quietest player about what they are hiding.".to_string();
        }

        let lines = [
            "I can keep the generator running; without me you freeze in a week.",
            "Something about the way you answered earlier does not add up.",
            "Let's stay calm and judge by what each of us actually contributes.",
            "I have treated worse than this. I stay, and I will prove it.",
        ];
        lines[n % lines.len()].to_string()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        !matches!(self.behavior, Behavior::Failing)
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let n = self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let content = match &self.behavior {
            Behavior::Failing => {
                return Err(LlmError::ConnectionFailed("mock provider is down".to_string()))
            }
            Behavior::Canned(responses) if responses.is_empty() => String::new(),
            Behavior::Canned(responses) => responses[n % responses.len()].clone(),
            Behavior::Scripted { rules, fallback } => rules
                .iter()
                .find(|(needle, _)| request.prompt.contains(needle.as_str()))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| fallback.clone()),
            Behavior::Tabletop => self.tabletop_response(&request, n),
        };

        Ok(LlmResponse {
            content,
            model: self.name.clone(),
            tokens_used: Some((request.prompt.len() / 4) as u32 + 50),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_constant_mock() {
        let mock = MockProvider::constant("Hello, bunker!");
        let response = mock.ask("test").await.unwrap();
        assert_eq!(response, "Hello, bunker!");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_scripted_mock() {
        let mock = MockProvider::scripted("fallback")
            .rule("vote", "{\"target\": \"Oleg\"}")
            .rule("speak", "I stay.");

        assert_eq!(mock.ask("please vote now").await.unwrap(), "{\"target\": \"Oleg\"}");
        assert_eq!(mock.ask("speak up").await.unwrap(), "I stay.");
        assert_eq!(mock.ask("something else").await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockProvider::failing();
        assert!(!mock.is_available().await);
        assert!(matches!(mock.ask("x").await, Err(LlmError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_tabletop_judge_output_is_json() {
        let mock = MockProvider::tabletop();
        let request = LlmRequest::json("judge", "Reply with {\"violation\": ...}");
        let response = mock.complete(request).await.unwrap();
        assert!(crate::json::str_field(&crate::json::parse_object(&response.content), "violation").is_some());
    }
}
