//! Serde request/response structs for the Anthropic Messages API.
//!
//! These types are used exclusively by [`AnthropicProvider`] to serialize
//! API requests and deserialize API responses. They are intentionally kept
//! private to the `anthropic` module.
//!
//! [`AnthropicProvider`]: super::AnthropicProvider

use serde::{Deserialize, Serialize};

/// Request body for Anthropic Messages API.
#[derive(Debug, Serialize)]
pub(super) struct ApiRequest {
    /// Model identifier.
    pub(super) model: String,
    /// Maximum tokens to generate.
    pub(super) max_tokens: u32,
    /// Sampling temperature.
    pub(super) temperature: f32,
    /// System prompt lifted out of the canonical message list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) system: Option<String>,
    /// Conversation messages (user/assistant only).
    pub(super) messages: Vec<ApiMessage>,
}

/// A single message in the API request.
#[derive(Debug, Serialize)]
pub(super) struct ApiMessage {
    /// Message role ("user" or "assistant").
    pub(super) role: String,
    /// Message text.
    pub(super) content: String,
}

/// Response body from Anthropic Messages API.
#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse {
    /// Response content blocks.
    #[serde(default)]
    pub(super) content: Vec<ContentBlock>,
}

/// Content block in API response.
#[derive(Debug, Deserialize)]
#[allow(dead_code)] // block_type is kept for Debug output
pub(super) struct ContentBlock {
    /// Content type (e.g., "text").
    #[serde(rename = "type", default)]
    pub(super) block_type: String,
    /// Text content (present for "text" type).
    #[serde(default)]
    pub(super) text: Option<String>,
}
