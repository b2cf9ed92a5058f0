use async_trait::async_trait;
use serde_json::Value;

pub mod json_repair;
pub mod openrouter;
pub mod resilient;
pub mod types;

pub use openrouter::OpenRouterClient;
pub use resilient::{CallState, ChatTransport, ResilientCaller, RetryPolicy, Step};
pub use types::ContentPart;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("OpenRouter API error: {status}")]
    Http { status: u16, body: String },
    #[error("Invalid API response structure")]
    InvalidEnvelope,
    #[error("Empty response from AI")]
    EmptyContent,
    #[error("Failed to parse AI response as JSON: {0}")]
    InvalidJson(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("OPENROUTER_API_KEY is not configured")]
    NotConfigured,
    #[error("{last} (gave up after {attempts} attempts)")]
    Exhausted { attempts: u32, last: Box<LlmError> },
}

impl LlmError {
    /// The classified error of the final attempt.
    pub fn last(&self) -> &LlmError {
        match self {
            Self::Exhausted { last, .. } => last.last(),
            other => other,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Anything that turns a system prompt plus multimodal user content into a
/// parsed JSON object.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn generate_json(
        &self,
        system_prompt: &str,
        content: &[ContentPart],
        model: &str,
    ) -> Result<Value, LlmError>;
}
