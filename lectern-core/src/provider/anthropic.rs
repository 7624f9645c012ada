//! Anthropic Claude LLM provider.
//!
//! Implements the [`LlmProvider`] trait for the Anthropic Messages API,
//! which carries system instructions in a dedicated field rather than in
//! the turn list.

mod types;

#[cfg(test)]
mod tests;

use std::time::Duration;

use async_trait::async_trait;

use super::{
    LlmProvider, ModelInfo, ProviderDescriptor, ProviderError, RequestOptions, ResolvedOptions,
};
use crate::message::{Message, Role};
use types::{ApiMessage, ApiRequest, ApiResponse};

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API endpoint.
pub const API_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Anthropic Claude provider.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use lectern_core::provider::{AnthropicProvider, LlmProvider, RequestOptions};
/// use lectern_core::message::{Message, Role};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = AnthropicProvider::new(Duration::from_secs(60));
/// let messages = vec![
///     Message::new(Role::System, "You help readers."),
///     Message::new(Role::User, "Hello, Claude!"),
/// ];
///
/// let reply = provider
///     .chat(&messages, &RequestOptions::default(), Some("sk-ant-..."))
///     .await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
pub struct AnthropicProvider {
    /// HTTP client for API requests.
    client: reqwest::Client,
    /// Messages API URL.
    endpoint: String,
    descriptor: ProviderDescriptor,
    models: Vec<ModelInfo>,
}

impl AnthropicProvider {
    /// Create a provider whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: super::http_client(timeout),
            endpoint: API_ENDPOINT.to_string(),
            descriptor: ProviderDescriptor::new("anthropic", "Anthropic", true),
            models: vec![
                ModelInfo::new("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet"),
                ModelInfo::new("claude-3-haiku-20240307", "Claude 3 Haiku"),
            ],
        }
    }

    /// Send requests to a different Messages URL.
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

    /// Split the canonical list into the `system` field and the turn list.
    ///
    /// The first system message, wherever it sits, becomes `system`. Any
    /// further system messages are dropped from the turns, since the API
    /// rejects them there.
    fn split_system(messages: &[Message]) -> (Option<String>, Vec<ApiMessage>) {
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone());

        let turns = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| ApiMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();

        (system, turns)
    }

    fn build_request(messages: &[Message], options: ResolvedOptions) -> ApiRequest {
        let (system, messages) = Self::split_system(messages);
        ApiRequest {
            model: options.model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system,
            messages,
        }
    }

    /// Pull the first content block's text out of a success body.
    fn extract_reply(&self, body: &str) -> Result<String, ProviderError> {
        let response: ApiResponse = serde_json::from_str(body).map_err(|e| {
            tracing::debug!(error = %e, "anthropic: success body is not a message");
            self.empty_response()
        })?;

        response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| self.empty_response())
    }

    fn empty_response(&self) -> ProviderError {
        ProviderError::EmptyResponse(self.descriptor.label.clone())
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
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
            has_system = request.system.is_some(),
            "anthropic: POST messages request"
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request);
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        let response = builder.send().await?;
        tracing::debug!(
            status = response.status().as_u16(),
            "anthropic: messages response status"
        );

        let body = super::success_body(response).await?;
        self.extract_reply(&body)
    }
}
