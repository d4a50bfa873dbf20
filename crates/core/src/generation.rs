use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    config::GenerationParams, error::GenerationError, provider::Provider, types::TaskKind,
};

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
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Which analysis this call serves. Not sent upstream.
    pub task: TaskKind,
    pub messages: Vec<ChatMessage>,
    pub params: GenerationParams,
}

/// A text-generation backend.
///
/// Implementations return the raw message text. An empty string is a valid
/// answer. Each call must be independent: dropping one in-flight future must
/// not disturb any other.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

/// Run one request under its own deadline. On elapse the call is dropped,
/// which cancels it without touching sibling calls.
pub async fn generate_with_deadline(
    generator: &dyn TextGenerator,
    request: GenerationRequest,
    timeout: Duration,
) -> Result<String, GenerationError> {
    match tokio::time::timeout(timeout, generator.generate(request)).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::Timeout(timeout)),
    }
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    attribution: Option<Attribution>,
    request_timeout: Option<Duration>,
}

/// App attribution sent as `HTTP-Referer` and `X-Title`. OpenRouter uses
/// these to credit traffic to an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub referer: String,
    pub title: String,
}

impl ChatCompletionsClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            attribution: None,
            request_timeout: None,
        }
    }

    pub fn for_provider(provider: &Provider, api_key: impl Into<String>) -> Self {
        Self::new(provider.config().api_url, api_key)
    }

    /// Share an existing connection pool.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_attribution(
        mut self,
        referer: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        self.attribution = Some(Attribution {
            referer: referer.into(),
            title: title.into(),
        });
        self
    }

    /// Transport-level timeout for each HTTP request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    fn build_request(&self, request: &GenerationRequest) -> reqwest::RequestBuilder {
        let body = serde_json::json!({
            "model": request.params.model,
            "messages": request.messages,
            "temperature": request.params.temperature,
            "max_tokens": request.params.max_tokens,
            "top_p": request.params.top_p,
        });

        let mut builder = self
            .http
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body);

        if let Some(attribution) = &self.attribution {
            builder = builder
                .header("HTTP-Referer", attribution.referer.as_str())
                .header("X-Title", attribution.title.as_str());
        }
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }

        builder
    }

    fn transport_error(&self, err: reqwest::Error) -> GenerationError {
        match self.request_timeout {
            Some(timeout) if err.is_timeout() => GenerationError::Timeout(timeout),
            _ => GenerationError::Transport(err.to_string()),
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let response = self
            .build_request(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::debug!(
                task = request.task.name(),
                status = status.as_u16(),
                %detail,
                "generation service rejected request"
            );
            return Err(GenerationError::UpstreamError {
                status: status.as_u16(),
            });
        }

        let envelope = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.transport_error(e)
                } else {
                    GenerationError::MalformedEnvelope {
                        reason: e.to_string(),
                    }
                }
            })?;

        extract_message_content(&envelope)
    }
}

/// Pull `choices[0].message.content` out of a chat completion envelope.
///
/// A missing or null `content` is an empty answer. A missing message is a
/// malformed envelope.
pub fn extract_message_content(envelope: &serde_json::Value) -> Result<String, GenerationError> {
    let message = envelope
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .filter(|message| message.is_object())
        .ok_or_else(|| GenerationError::MalformedEnvelope {
            reason: "missing choices[0].message".to_string(),
        })?;

    match message.get("content") {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(content)) => Ok(content.clone()),
        Some(other) => Err(GenerationError::MalformedEnvelope {
            reason: format!("message content is not text: {other}"),
        }),
    }
}
