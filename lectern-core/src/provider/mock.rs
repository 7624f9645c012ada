//! Mock LLM provider for testing.
//!
//! Provides [`MockProvider`], a configurable mock implementation
//! of [`LlmProvider`] for unit and integration testing.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{
    LlmProvider, ModelInfo, ProviderDescriptor, ProviderError, RequestOptions,
    require_credential,
};
use crate::message::Message;

/// One recorded [`chat`](LlmProvider::chat) call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Messages the caller sent.
    pub messages: Vec<Message>,
    /// Options the caller sent.
    pub options: RequestOptions,
    /// Whether a credential accompanied the call.
    pub had_credential: bool,
}

/// A mock LLM provider for testing.
///
/// Returns configurable replies or errors and records every call that got
/// past the credential check. If nothing is queued, replies "Mock response".
///
/// # Examples
///
/// ```
/// use lectern_core::provider::{LlmProvider, MockProvider, RequestOptions};
/// use lectern_core::message::{Message, Role};
///
/// # async fn example() {
/// let provider = MockProvider::new().with_response("Hello from mock!");
/// let messages = vec![Message::new(Role::User, "Hi")];
///
/// let reply = provider
///     .chat(&messages, &RequestOptions::default(), None)
///     .await
///     .unwrap();
/// assert_eq!(reply, "Hello from mock!");
/// assert_eq!(provider.calls().len(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct MockProvider {
    descriptor: ProviderDescriptor,
    models: Vec<ModelInfo>,
    replies: Mutex<Vec<Result<String, ProviderError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            descriptor: ProviderDescriptor::new("mock", "Mock", false),
            models: vec![
                ModelInfo::new("mock-large", "Mock Large"),
                ModelInfo::new("mock-small", "Mock Small"),
            ],
            replies: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockProvider {
    /// Create a mock named "mock" that needs no credential.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the descriptor, e.g. to stand in for "openai".
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: ProviderDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Replace the model catalog.
    #[must_use]
    pub fn with_models(mut self, models: Vec<ModelInfo>) -> Self {
        self.models = models;
        self
    }

    /// Queue a reply.
    ///
    /// Replies are returned in LIFO order (last added = first returned).
    #[must_use]
    pub fn with_response(self, content: impl Into<String>) -> Self {
        lock(&self.replies).push(Ok(content.into()));
        self
    }

    /// Queue an error, returned in the same LIFO order as replies.
    #[must_use]
    pub fn with_error(self, error: ProviderError) -> Self {
        lock(&self.replies).push(Err(error));
        self
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }
}

/// Lock a mutex, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
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
        let credential = require_credential(&self.descriptor, credential)?;

        lock(&self.calls).push(RecordedCall {
            messages: messages.to_vec(),
            options: options.clone(),
            had_credential: credential.is_some(),
        });

        lock(&self.replies)
            .pop()
            .unwrap_or_else(|| Ok("Mock response".to_string()))
    }
}
