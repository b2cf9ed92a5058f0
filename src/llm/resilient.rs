//! Retrying JSON-mode caller.
//!
//! Each call walks a small state machine:
//!
//! ```text
//! Attempting --ok--------------------------------> Done(Ok)
//! Attempting --reply is not a JSON object--> Repairing --salvaged--> Done(Ok)
//! Attempting --http/envelope/empty/timeout--> Failed
//! Repairing  --nothing salvageable----------> Failed
//! Failed     --attempts left--> Attempting
//! Failed     --exhausted------> Done(Err)
//! ```
//!
//! A caller only ever sees a parsed JSON object or an error.

use async_trait::async_trait;
use log::{trace, warn};
use serde_json::{Map, Value};
use std::time::Duration;

use super::json_repair::{parse_object, salvage_object};
use super::types::{ChatRequest, ChatResponse, ContentPart, TransportReply};
use super::LlmError;
use crate::core::shared::utils::truncate_chars;

/// Sends one request and returns the raw HTTP reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<TransportReply, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::ZERO,
        }
    }
}

#[derive(Debug)]
pub enum CallState {
    Attempting { attempt: u32 },
    Repairing { attempt: u32, raw: String, cause: String },
    Failed { attempt: u32, error: LlmError },
}

#[derive(Debug)]
pub enum Step {
    Next(CallState),
    Done(Result<Value, LlmError>),
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Transition out of `Failed`. `attempt` is zero-based.
    pub fn after_failure(&self, attempt: u32, error: LlmError) -> Step {
        if attempt < self.max_retries {
            Step::Next(CallState::Attempting {
                attempt: attempt + 1,
            })
        } else {
            Step::Done(Err(LlmError::Exhausted {
                attempts: attempt + 1,
                last: Box::new(error),
            }))
        }
    }
}

enum Classified {
    Parsed(Map<String, Value>),
    NeedsRepair { raw: String, cause: String },
}

fn classify(reply: TransportReply) -> Result<Classified, LlmError> {
    if reply.status != 200 {
        return Err(LlmError::Http {
            status: reply.status,
            body: truncate_chars(&reply.body, 500).to_string(),
        });
    }

    let envelope: ChatResponse =
        serde_json::from_str(&reply.body).map_err(|_| LlmError::InvalidEnvelope)?;
    let content = envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or(LlmError::InvalidEnvelope)?
        .content
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }

    match parse_object(&content) {
        Ok(obj) => Ok(Classified::Parsed(obj)),
        Err(e) => Ok(Classified::NeedsRepair {
            raw: content,
            cause: e.to_string(),
        }),
    }
}

pub struct ResilientCaller<T: ChatTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: ChatTransport> ResilientCaller<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Calls the model with the configured retry count.
    pub async fn call_default(
        &self,
        system_prompt: &str,
        content: &[ContentPart],
        model: &str,
    ) -> Result<Value, LlmError> {
        self.call(system_prompt, content, model, self.policy.max_retries)
            .await
    }

    pub async fn call(
        &self,
        system_prompt: &str,
        content: &[ContentPart],
        model: &str,
        max_retries: u32,
    ) -> Result<Value, LlmError> {
        let policy = RetryPolicy {
            max_retries,
            ..self.policy
        };
        let request = ChatRequest::json_mode(system_prompt, content, model);
        let mut state = CallState::Attempting { attempt: 0 };

        loop {
            let step = match state {
                CallState::Attempting { attempt } => self.attempt(&request, attempt).await,
                CallState::Repairing {
                    attempt,
                    raw,
                    cause,
                } => Self::repair(attempt, &raw, cause),
                CallState::Failed { attempt, error } => {
                    warn!(
                        "LLM call to {} failed (attempt {}/{}): {}",
                        model,
                        attempt + 1,
                        policy.total_attempts(),
                        error
                    );
                    let step = policy.after_failure(attempt, error);
                    if matches!(step, Step::Next(_)) && !policy.backoff.is_zero() {
                        tokio::time::sleep(policy.backoff).await;
                    }
                    step
                }
            };

            match step {
                Step::Next(next) => state = next,
                Step::Done(result) => return result,
            }
        }
    }

    async fn attempt(&self, request: &ChatRequest, attempt: u32) -> Step {
        trace!("LLM attempt {} with model {}", attempt + 1, request.model);
        let reply = match self.transport.send(request).await {
            Ok(reply) => reply,
            Err(error) => return Step::Next(CallState::Failed { attempt, error }),
        };

        if reply.status != 200 {
            warn!(
                "LLM provider returned {} (attempt {}): {}",
                reply.status,
                attempt + 1,
                truncate_chars(&reply.body, 500)
            );
        }

        match classify(reply) {
            Ok(Classified::Parsed(obj)) => Step::Done(Ok(Value::Object(obj))),
            Ok(Classified::NeedsRepair { raw, cause }) => Step::Next(CallState::Repairing {
                attempt,
                raw,
                cause,
            }),
            Err(error) => Step::Next(CallState::Failed { attempt, error }),
        }
    }

    fn repair(attempt: u32, raw: &str, cause: String) -> Step {
        warn!(
            "LLM reply was not a JSON object (attempt {}): {}; content: {}",
            attempt + 1,
            cause,
            truncate_chars(raw, 500)
        );
        match salvage_object(raw) {
            Some(obj) => Step::Done(Ok(Value::Object(obj))),
            None => Step::Next(CallState::Failed {
                attempt,
                error: LlmError::InvalidJson(cause),
            }),
        }
    }
}
