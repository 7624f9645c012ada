//! OpenAI-compatible LLM provider.
//!
//! Implements the [`LlmProvider`] trait for the Chat Completions API. The
//! endpoint is configurable, so any OpenAI-compatible gateway works.

mod types;


use std::time::Duration;

use async_trait::async_trait;

use super::{
    LlmProvider, ModelInfo, ProviderDescriptor, ProviderError, RequestOptions, ResolvedOptions,
};
use crate::message::Message;
use types::{ApiMessage, ApiRequest, ApiResponse};

/// OpenAI Chat Completions API endpoint.
pub const API_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI provider.
///
/// Holds no credential; the key arrives with each [`chat`](LlmProvider::chat)
/// call and is sent as a bearer token.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use lectern_core::provider::{LlmProvider, OpenAiProvider, RequestOptions};
/// use lectern_core::message::{Message, Role};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = OpenAiProvider::new(Duration::from_secs(60));
/// let messages = vec![Message::new(Role::User, "Summarise this page.")];
///
/// let reply = provider
///     .chat(&messages, &RequestOptions::default(), Some("sk-..."))
///     .await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    /// HTTP client for API requests.
    client: reqwest::Client,
    /// Chat Completions URL.
    endpoint: String,
    descriptor: ProviderDescriptor,
    models: Vec<ModelInfo>,
}

impl OpenAiProvider {
    /// Create a provider whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: super::http_client(timeout),
            endpoint: API_ENDPOINT.to_string(),
            descriptor: ProviderDescriptor::new("openai", "OpenAI", true),
            models: vec![
                ModelInfo::new("gpt-4o", "GPT-4o"),
                ModelInfo::new("gpt-4o-mini", "GPT-4o Mini"),
                ModelInfo::new("gpt-3.5-turbo", "GPT-3.5 Turbo"),
            ],
        }
    }

    /// Send requests to a different Chat Completions URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use a caller-supplied HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build the request body. Messages pass through in canonical order.
    fn build_request(messages: &[Message], options: ResolvedOptions) -> ApiRequest {
        ApiRequest {
            model: options.model,
            messages: messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }

    /// Pull the reply text out of a success body.
    fn extract_reply(&self, body: &str) -> Result<String, ProviderError> {
        let response: ApiResponse = serde_json::from_str(body).map_err(|e| {
            tracing::debug!(error = %e, "openai: success body is not a completion");
            self.empty_response()
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| self.empty_response())
    }

    fn empty_response(&self) -> ProviderError {
        ProviderError::EmptyResponse(self.descriptor.label.clone())
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    async fn chat(
        &self,
        messages: &[Message],
        options: &RequestOptions,
        credential: Option<&str>,
    ) -> Result<String, ProviderError> {
        let api_key = super::require_credential(&self.descriptor, credential)?;
        let request = Self::build_request(messages, options.resolve(DEFAULT_MODEL));

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            messages = request.messages.len(),
            "openai: POST chat request"
        );

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;
        tracing::debug!(
            status = response.status().as_u16(),
            "openai: chat response status"
        );

        let body = super::success_body(response).await?;
        self.extract_reply(&body)
    }
}
