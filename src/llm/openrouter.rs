use async_trait::async_trait;
use log::info;
use serde_json::Value;
use std::time::Duration;

use super::resilient::{ChatTransport, ResilientCaller, RetryPolicy};
use super::types::{ChatRequest, ContentPart, TransportReply};
use super::{LLMProvider, LlmError};
use crate::core::config::LlmConfig;

/// reqwest transport for the OpenRouter chat-completions endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    referer: String,
    title: String,
}

impl HttpTransport {
    fn build_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Ok(val) = format!("Bearer {}", self.api_key).parse() {
            headers.insert(reqwest::header::AUTHORIZATION, val);
        }
        if let Ok(val) = "application/json".parse() {
            headers.insert(reqwest::header::CONTENT_TYPE, val);
        }
        if let Ok(val) = self.referer.parse() {
            headers.insert("http-referer", val);
        }
        if let Ok(val) = self.title.parse() {
            headers.insert("x-title", val);
        }

        headers
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<TransportReply, LlmError> {
        let response = self
            .client
            .post(&self.api_url)
            .headers(self.build_headers())
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportReply { status, body })
    }
}

pub struct OpenRouterClient {
    caller: Option<ResilientCaller<HttpTransport>>,
    api_url: String,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("api_url", &self.api_url)
            .field("configured", &self.caller.is_some())
            .finish()
    }
}

impl OpenRouterClient {
    /// A client without an API key is still constructed so the server can start;
    /// every call then fails with `LlmError::NotConfigured`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());

        let caller = match api_key {
            Some(api_key) => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(config.timeout_secs))
                    .build()?;
                let transport = HttpTransport {
                    client,
                    api_url: config.api_url.clone(),
                    api_key,
                    referer: config.referer.clone(),
                    title: config.title.clone(),
                };
                let policy = RetryPolicy::new(
                    config.max_retries,
                    Duration::from_millis(config.retry_backoff_ms),
                );
                Some(ResilientCaller::new(transport, policy))
            }
            None => None,
        };

        info!(
            "OpenRouter client for {} ({})",
            config.api_url,
            if caller.is_some() {
                "configured"
            } else {
                "no API key"
            }
        );

        Ok(Self {
            caller,
            api_url: config.api_url.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.caller.is_some()
    }
}

#[async_trait]
impl LLMProvider for OpenRouterClient {
    async fn generate_json(
        &self,
        system_prompt: &str,
        content: &[ContentPart],
        model: &str,
    ) -> Result<Value, LlmError> {
        let caller = self.caller.as_ref().ok_or(LlmError::NotConfigured)?;
        info!("OpenRouter request: model={model}, parts={}", content.len());
        caller.call_default(system_prompt, content, model).await
    }
}
