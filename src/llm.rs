//! Chat model client - OpenAI-compatible chat completions (Groq)
//!
//! `ChatModel` is the seam the answer service talks to; `GroqClient` is the
//! production implementation. Failures are classified into `LlmError` so the
//! HTTP layer can tell a timeout from a rejected request or a garbled body.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Groq API key not configured")]
    MissingApiKey,
    #[error("AI service timeout")]
    Timeout,
    #[error("Groq API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("malformed AI service response: {0}")]
    MalformedResponse(String),
    #[error("AI service request failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// A model that turns chat messages into one text completion
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// Connection and generation settings for the chat completions endpoint
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: GROQ_API_URL.to_string(),
            model: GROQ_MODEL.to_string(),
            timeout: Duration::from_secs(30),
            // Low temperature keeps legal answers factual
            temperature: 0.3,
            max_tokens: 1500,
            top_p: 0.9,
        }
    }
}

pub struct GroqClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl GroqClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    fn request_body(&self, messages: &[ChatMessage]) -> Value {
        json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "top_p": self.config.top_p,
        })
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.api_key().ok_or(LlmError::MissingApiKey)?;

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&self.request_body(messages))
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = resp.status();
        let text = resp.text().await.map_err(classify_reqwest_error)?;

        if !status.is_success() {
            tracing::warn!("Groq API returned {}: {}", status, text);
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| LlmError::MalformedResponse(format!("invalid JSON: {}", e)))?;
        let reply = parse_completion(&json)?;

        tracing::debug!(
            "Groq completion ({} chars) in {:?}",
            reply.len(),
            start.elapsed()
        );
        Ok(reply)
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Transport(e.to_string())
    }
}

/// Pull `choices[0].message.content` out of a chat completion response
fn parse_completion(json: &Value) -> Result<String, LlmError> {
    json.get("choices")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| LlmError::MalformedResponse("missing choices[0].message.content".to_string()))
}
