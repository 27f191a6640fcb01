//! # Bunker LLM
//!
//! The generation interface Bunker agents and the judge talk to.
//!
//! | Provider | Type | Key Required |
//! |----------|------|--------------|
//! | OpenAI-compatible | API | `BUNKER_LLM_API_KEY` (optional for local servers) |
//! | Mock | Testing / offline | None |
//!
//! Game code never calls a provider directly: it goes through a [`Generator`],
//! which applies the response deadline and turns every failure into a
//! fallback value.
//!
//! ```rust
//! use std::sync::Arc;
//! use bunker_llm::{Generator, LlmRequest, MockProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let generator = Generator::new(Arc::new(MockProvider::failing()));
//!     // failures surface as an empty string, never as an error
//!     let text = generator.text(LlmRequest::with_role("You are Vera.", "Speak.")).await;
//!     assert!(text.is_empty());
//! }
//! ```

pub mod config;
pub mod guard;
pub mod json;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod retry;

pub use config::LlmConfig;
pub use guard::{Generator, GENERATION_DEADLINE};
pub use mock::MockProvider;
pub use openai::OpenAiCompatProvider;
pub use provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};
pub use retry::{RetryConfig, RetryingProvider};
