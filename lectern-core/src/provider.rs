//! LLM provider abstraction layer.
//!
//! Defines the [`LlmProvider`] trait that all provider adapters implement,
//! the [`ProviderError`] taxonomy, and the static identity types
//! ([`ProviderDescriptor`], [`ModelInfo`]) the registry hands out.

mod anthropic;
mod mock;
mod openai;
mod registry;

#[cfg(test)]
pub(crate) mod test_server;

pub use anthropic::AnthropicProvider;
pub use mock::{MockProvider, RecordedCall};
pub use openai::OpenAiProvider;
pub use registry::ProviderRegistry;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::message::Message;

/// Error type for provider operations.
///
/// Every variant renders as a user-facing message through `Display`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The selected provider name is not registered.
    #[error("selected provider '{0}' is not available")]
    UnknownProvider(String),

    /// The provider needs a credential and none was supplied.
    #[error("login required: {0}")]
    MissingApiKey(String),

    /// The request never produced a response (DNS, connect, timeout, reset).
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The provider answered with a non-success status.
    #[error("{}", status_message(*status, reason, detail.as_deref()))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status, empty if unknown.
        reason: String,
        /// The provider's own error message, when the body carried one.
        detail: Option<String>,
    },

    /// The provider answered successfully but without usable reply text.
    #[error("no response from {0}")]
    EmptyResponse(String),
}

fn status_message(status: u16, reason: &str, detail: Option<&str>) -> String {
    let mut message = format!("provider returned HTTP {status}");
    if !reason.is_empty() {
        message.push(' ');
        message.push_str(reason);
    }
    if let Some(detail) = detail {
        message.push_str(" - ");
        message.push_str(detail);
    }
    message
}

/// Coarse classification of a [`ProviderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown provider name.
    ProviderUnavailable,
    /// Credential missing for a provider that mandates one.
    AuthRequired,
    /// Transport failure before any response arrived.
    Network,
    /// Non-success response from a reachable provider.
    Provider,
    /// Success response with no usable content.
    EmptyResponse,
}

impl ProviderError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::UnknownProvider(_) => ErrorKind::ProviderUnavailable,
            ProviderError::MissingApiKey(_) => ErrorKind::AuthRequired,
            ProviderError::RequestFailed(_) => ErrorKind::Network,
            ProviderError::Status { .. } => ErrorKind::Provider,
            ProviderError::EmptyResponse(_) => ErrorKind::EmptyResponse,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::RequestFailed(format!("request timed out: {err}"))
        } else if err.is_connect() {
            ProviderError::RequestFailed(format!("connection failed: {err}"))
        } else {
            ProviderError::RequestFailed(err.to_string())
        }
    }
}

/// Static identity of a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Registry key (e.g., "openai").
    pub name: String,
    /// Human-readable name (e.g., "OpenAI").
    pub label: String,
    /// Whether a credential must be supplied with every call.
    pub auth_required: bool,
}

impl ProviderDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, label: impl Into<String>, auth_required: bool) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            auth_required,
        }
    }
}

/// One entry of a provider's model catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Identifier sent on the wire.
    pub id: String,
    /// Human-readable name.
    pub label: String,
}

impl ModelInfo {
    /// Create a catalog entry.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Per-call tuning. Absent fields fall back to adapter defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Model identifier.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Cap on generated tokens.
    pub max_tokens: Option<u32>,
}

/// [`RequestOptions`] with every field filled in.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedOptions {
    pub(crate) model: String,
    pub(crate) temperature: f32,
    pub(crate) max_tokens: u32,
}

impl RequestOptions {
    /// Fill absent fields from the given defaults.
    pub(crate) fn resolve(&self, default_model: &str) -> ResolvedOptions {
        ResolvedOptions {
            model: self
                .model
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| default_model.to_string()),
            temperature: self
                .temperature
                .unwrap_or(crate::config::DEFAULT_TEMPERATURE),
            max_tokens: self
                .max_tokens
                .filter(|n| *n > 0)
                .unwrap_or(crate::config::DEFAULT_MAX_TOKENS),
        }
    }
}

/// Trait for LLM providers.
///
/// Implementations must be thread-safe (`Send + Sync`) so the registry can
/// share them across conversations.
///
/// # Examples
///
/// ```
/// use lectern_core::provider::{LlmProvider, MockProvider, RequestOptions};
/// use lectern_core::message::{Message, Role};
///
/// # async fn example() {
/// let provider = MockProvider::new().with_response("A sea voyage.");
/// let messages = vec![Message::new(Role::User, "What is this chapter about?")];
///
/// let reply = provider
///     .chat(&messages, &RequestOptions::default(), None)
///     .await
///     .unwrap();
/// assert_eq!(reply, "A sea voyage.");
/// # }
/// ```
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Static identity of this provider.
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Models this provider offers, in display order.
    fn models(&self) -> &[ModelInfo];

    /// Send messages to the model and return its reply text.
    ///
    /// # Arguments
    ///
    /// * `messages` - Canonical message list, at most one leading system message
    /// * `options` - Per-call tuning; absent fields use adapter defaults
    /// * `credential` - API key, required when the descriptor says so
    ///
    /// # Errors
    ///
    /// - [`ProviderError::MissingApiKey`] before any network access if a
    ///   required credential is absent
    /// - [`ProviderError::RequestFailed`] on transport failure
    /// - [`ProviderError::Status`] on a non-success response
    /// - [`ProviderError::EmptyResponse`] when the reply has no text
    async fn chat(
        &self,
        messages: &[Message],
        options: &RequestOptions,
        credential: Option<&str>,
    ) -> Result<String, ProviderError>;
}

/// Return the credential, or fail if the provider needs one and it is absent.
pub(crate) fn require_credential<'a>(
    descriptor: &ProviderDescriptor,
    credential: Option<&'a str>,
) -> Result<Option<&'a str>, ProviderError> {
    let credential = credential.filter(|c| !c.is_empty());
    if descriptor.auth_required && credential.is_none() {
        return Err(ProviderError::MissingApiKey(format!(
            "{} API key is required",
            descriptor.label
        )));
    }
    Ok(credential)
}

/// Error envelope shared by the OpenAI and Anthropic APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Build a [`ProviderError::Status`] from a non-success response.
///
/// The body's `error.message` is attached when present; any other body
/// (HTML, empty, truncated JSON) leaves only the status line.
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .filter(|m| !m.is_empty());

    ProviderError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
        detail,
    }
}

/// Read a provider response, returning the body of a success status.
///
/// Non-success statuses become [`ProviderError::Status`] whatever happens
/// to the body: an unreadable or truncated error body only loses the
/// provider's detail message, never the status.
pub(crate) async fn success_body(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|e| {
            tracing::debug!(status = status.as_u16(), error = %e, "provider: unreadable error body");
            String::new()
        });
        return Err(status_error(status, &body));
    }
    Ok(response.text().await?)
}

/// Build the HTTP client an adapter uses, bounded by `timeout`.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::error!(
                error = %e,
                timeout_ms = timeout.as_millis() as u64,
                "provider: HTTP client build failed, requests will run without the configured timeout"
            );
            reqwest::Client::new()
        })
}
