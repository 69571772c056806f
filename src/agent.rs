//! Assistant collaborator: AI-query recognition and provider clients.
//!
//! The engine only ever sees `respond(prompt) -> Result<String, AgentError>`;
//! everything else (transport, credentials, model choice) stays behind the
//! trait. `OpenAiAgent` talks to any OpenAI-compatible chat endpoint;
//! `EchoAgent` is the offline stand-in for development and tests.

use crate::config::AgentConfig;
use crate::error::AgentError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// User-facing prefix that marks a line as an AI query.
pub const AI_PREFIX: &str = ">>";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// True when the line is an AI query: starts with the prefix and has
/// non-whitespace content after it.
pub fn is_ai_query(line: &str) -> bool {
    let trimmed = line.trim();
    match trimmed.strip_prefix(AI_PREFIX) {
        Some(rest) => !rest.trim().is_empty(),
        None => false,
    }
}

/// Strip the AI prefix (if present) and surrounding whitespace.
pub fn strip_ai_prefix(line: &str) -> &str {
    let trimmed = line.trim();
    trimmed
        .strip_prefix(AI_PREFIX)
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// The assistant collaborator interface.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Send one prompt and return the assistant's reply text.
    async fn respond(&self, prompt: &str) -> Result<String, AgentError>;
}

// ---------------------------------------------------------------------------
// OpenAI-compatible client
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Agent backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiAgent {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiAgent {
    /// Build a client from agent configuration.
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Agent for OpenAiAgent {
    async fn respond(&self, prompt: &str) -> Result<String, AgentError> {
        if self.api_key.is_empty() {
            return Err(AgentError::NotConfigured);
        }

        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        debug!(url, model = %self.model, "sending assistant request");

        let response = self
            .http
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let reply: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                AgentError::MalformedReply(e.to_string())
            } else {
                AgentError::Api(format!("status {}", status.as_u16()))
            }
        })?;

        if let Some(err) = reply.error {
            return Err(AgentError::Api(err.message));
        }
        let Some(choice) = reply.choices.into_iter().next() else {
            return Err(AgentError::EmptyReply);
        };
        let content = choice.message.content.unwrap_or_default();
        Ok(content.trim_end_matches(['\n', '\r', ' ']).to_string())
    }
}

// ---------------------------------------------------------------------------
// Offline echo agent
// ---------------------------------------------------------------------------

/// Stub agent that echoes prompts; useful without network or credentials.
#[derive(Debug, Default)]
pub struct EchoAgent;

#[async_trait]
impl Agent for EchoAgent {
    async fn respond(&self, prompt: &str) -> Result<String, AgentError> {
        Ok(format!("Echo: {prompt}"))
    }
}
