//! Completion service client
//!
//! One non-streaming request per call:
//! - Endpoint: POST /api/v2/cortex/inference:complete
//! - Bearer token auth
//! - Bounded request timeout, no retries

use crate::completion::catalog::ModelId;
use crate::errors::{KaiError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Path of the completion endpoint relative to the account base URL
pub const COMPLETE_PATH: &str = "/api/v2/cortex/inference:complete";

/// Request timeout (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SERVICE: &str = "completion";

/// Anything that can turn a prompt into text with a given model
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, model: ModelId, prompt: &str) -> Result<String>;
}

/// HTTP client for the hosted completion service
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpCompletionClient {
    /// Create client with custom configuration
    pub fn with_config(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(KaiError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            timeout,
        })
    }

    /// Full endpoint URL
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, COMPLETE_PATH)
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionService for HttpCompletionClient {
    async fn complete(&self, model: ModelId, prompt: &str) -> Result<String> {
        let request = CompleteRequest {
            model: model.as_str(),
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| KaiError::from_send(SERVICE, e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(KaiError::external(
                SERVICE,
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| KaiError::external(SERVICE, format!("Failed to read response: {}", e)))?;

        parse_completion_body(&body)
    }
}

/// Extract the generated text from a completion response body.
///
/// Accepts the chat-style `choices[0].message.content`, the older
/// `choices[0].messages`, and flat `text` / `response` bodies.
pub fn parse_completion_body(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| KaiError::parse("completion response", e.to_string()))?;

    let first_choice = value.get("choices").and_then(|c| c.get(0));

    let text = first_choice
        .and_then(|c| c.pointer("/message/content"))
        .or_else(|| first_choice.and_then(|c| c.get("messages")))
        .or_else(|| value.get("text"))
        .or_else(|| value.get("response"))
        .and_then(Value::as_str);

    match text {
        Some(text) => Ok(text.to_string()),
        None => Err(KaiError::parse(
            "completion response",
            "no generated text found in body",
        )),
    }
}

#[derive(Debug, Serialize)]
struct CompleteRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}
