//! Serde request/response structs for the Chat Completions API.
//!
//! These types are used exclusively by [`OpenAiProvider`] and are kept
//! private to the `openai` module.
//!
//! [`OpenAiProvider`]: super::OpenAiProvider

use serde::{Deserialize, Serialize};

/// A single message in the API request body.
#[derive(Debug, Serialize)]
pub(super) struct ApiMessage {
    /// Message role ("system", "user" or "assistant").
    pub(super) role: String,
    /// Message content.
    pub(super) content: String,
}

/// Request body for a Chat Completions call.
#[derive(Debug, Serialize)]
pub(super) struct ApiRequest {
    /// Model identifier.
    pub(super) model: String,
    /// Conversation messages, system message included.
    pub(super) messages: Vec<ApiMessage>,
    /// Sampling temperature.
    pub(super) temperature: f32,
    /// Maximum tokens to generate.
    pub(super) max_tokens: u32,
}

/// Response body from a Chat Completions call.
#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse {
    /// Completion choices; only the first is used.
    #[serde(default)]
    pub(super) choices: Vec<Choice>,
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
pub(super) struct Choice {
    #[serde(default)]
    pub(super) message: Option<ResponseMessage>,
}

/// Assistant message inside a choice.
#[derive(Debug, Deserialize)]
pub(super) struct ResponseMessage {
    /// Reply text; `null` when the model produced none.
    #[serde(default)]
    pub(super) content: Option<String>,
}
