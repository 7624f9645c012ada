//! Conversation controller.
//!
//! Provides [`Conversation`], which owns the visible turns of one chat about
//! a selection and drives the turn state machine:
//!
//! - `Idle` / `Error` → `submit` appends the user turn at once, then either
//!   fails fast (unknown provider, missing login) or moves to `Sending`
//! - `Sending` → `finish` appends the assistant turn (`Idle`) or records the
//!   failure (`Error`); the user turn always stays
//!
//! The network call happens in [`PendingReply::run`], which does not borrow
//! the conversation. A reply whose conversation was dropped or cleared is
//! simply discarded.


use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use crate::config::{ChatConfig, Config, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::context::{BookInfo, ContextBuilder, ReadingView};
use crate::message::{Message, Turn};
use crate::preferences::{Preference, PreferenceStore};
use crate::prompt;
use crate::provider::{
    LlmProvider, ModelInfo, ProviderError, ProviderRegistry, RequestOptions, require_credential,
};

/// Where the conversation stands.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// Ready for input.
    Idle,
    /// A request is in flight; `submit` is rejected.
    Sending,
    /// The last submission failed. Input is still accepted.
    Error(ProviderError),
}

impl Status {
    /// User-facing error text, if the last submission failed.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Status::Error(e) => Some(e.to_string()),
            _ => None,
        }
    }
}

/// Everything an observer needs to render the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Visible turns, oldest first.
    pub turns: Vec<Turn>,
    /// Current status.
    pub status: Status,
    /// Selected provider name.
    pub provider: String,
    /// Selected model identifier.
    pub model: String,
}

/// A provider as offered in the provider picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOption {
    /// Registry key.
    pub name: String,
    /// Display label, suffixed with "(Login Required)" when unusable.
    pub label: String,
    /// Whether a submission would get past the credential check.
    pub available: bool,
}

/// A request that has been accepted and is ready to go on the wire.
///
/// Holds its own copy of everything the call needs, so it can be awaited
/// (or spawned) while the conversation stays usable.
pub struct PendingReply {
    request_id: Uuid,
    provider: Arc<dyn LlmProvider>,
    messages: Vec<Message>,
    options: RequestOptions,
    credential: Option<String>,
}

impl PendingReply {
    /// Canonical messages that will be sent.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Options that will be sent.
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Perform the provider call.
    pub async fn run(self) -> CompletedReply {
        tracing::debug!(
            request_id = %self.request_id,
            provider = %self.provider.descriptor().name,
            "conversation: sending request"
        );
        let result = self
            .provider
            .chat(&self.messages, &self.options, self.credential.as_deref())
            .await;

        CompletedReply {
            request_id: self.request_id,
            result,
        }
    }
}

/// Outcome of a [`PendingReply`], to be handed back via [`Conversation::finish`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedReply {
    request_id: Uuid,
    result: Result<String, ProviderError>,
}

impl CompletedReply {
    /// The reply text or the failure.
    pub fn result(&self) -> &Result<String, ProviderError> {
        &self.result
    }
}

/// One chat about one selection.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lectern_core::context::BookInfo;
/// use lectern_core::conversation::{Conversation, Status};
/// use lectern_core::provider::{MockProvider, ProviderRegistry};
///
/// # async fn example() {
/// let registry = Arc::new(ProviderRegistry::new(vec![Arc::new(
///     MockProvider::new().with_response("He is the narrator."),
/// )]));
/// let mut conversation = Conversation::new(
///     registry,
///     BookInfo::new("Moby-Dick", "Herman Melville"),
///     "Call me Ishmael.",
/// );
///
/// let status = conversation.send("Who is Ishmael?").await;
/// assert_eq!(*status, Status::Idle);
/// assert_eq!(conversation.turns()[1].content, "He is the narrator.");
/// # }
/// ```
pub struct Conversation {
    registry: Arc<ProviderRegistry>,
    book: BookInfo,
    view: Option<Arc<dyn ReadingView>>,
    selected_text: String,
    page_text: Option<String>,
    context_builder: ContextBuilder,
    temperature: f32,
    max_tokens: u32,
    credential: Option<String>,
    preferences: Option<Arc<dyn PreferenceStore>>,
    provider: String,
    model: String,
    turns: Vec<Turn>,
    status: Status,
    in_flight: Option<Uuid>,
    updates: watch::Sender<Snapshot>,
}

impl Conversation {
    /// Start a conversation about `selected_text` in `book`.
    ///
    /// The registry's first provider and its first model are selected until
    /// configuration or a stored preference says otherwise.
    pub fn new(
        registry: Arc<ProviderRegistry>,
        book: BookInfo,
        selected_text: impl Into<String>,
    ) -> Self {
        let (provider, model) = match registry.first() {
            Some(p) => (
                p.descriptor().name.clone(),
                p.models().first().map(|m| m.id.clone()).unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };

        let (updates, _) = watch::channel(Snapshot {
            turns: Vec::new(),
            status: Status::Idle,
            provider: provider.clone(),
            model: model.clone(),
        });

        Self {
            registry,
            book,
            view: None,
            selected_text: selected_text.into(),
            page_text: None,
            context_builder: ContextBuilder::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            credential: None,
            preferences: None,
            provider,
            model,
            turns: Vec::new(),
            status: Status::Idle,
            in_flight: None,
            updates,
        }
    }

    /// Apply configuration: default provider/model and chat tuning.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.provider = config.provider.clone();
        self.model = config.model.clone();
        self.apply_chat_config(&config.chat);
        self
    }

    /// Read the live view for page text and chapter on every submission.
    #[must_use]
    pub fn with_view(mut self, view: Arc<dyn ReadingView>) -> Self {
        self.view = Some(view);
        self
    }

    /// Use `text` as the current page context instead of the view's text.
    #[must_use]
    pub fn with_page_text(mut self, text: impl Into<String>) -> Self {
        self.page_text = Some(text.into());
        self
    }

    /// Set the signed-in user's API key.
    #[must_use]
    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.set_credential(credential);
        self
    }

    /// Seed provider/model from the stored preference and persist later changes.
    ///
    /// A store that cannot be read is logged and otherwise ignored.
    #[must_use]
    pub fn with_preferences(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        match store.load() {
            Ok(Some(preference)) => {
                tracing::debug!(
                    provider = %preference.provider,
                    model = %preference.model,
                    "conversation: using stored preference"
                );
                self.provider = preference.provider;
                self.model = preference.model;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "conversation: could not read preferences"),
        }
        self.preferences = Some(store);
        self
    }

    /// Select `name` for this conversation only; nothing is persisted.
    ///
    /// Behaves like [`change_provider`](Self::change_provider) otherwise, so
    /// the model resets to the provider's first declared model.
    #[must_use]
    pub fn with_provider(mut self, name: &str) -> Self {
        self.select_provider(name);
        self
    }

    /// Select model `id` for this conversation only; nothing is persisted.
    #[must_use]
    pub fn with_model(mut self, id: &str) -> Self {
        self.model = id.to_string();
        self
    }

    fn apply_chat_config(&mut self, chat: &ChatConfig) {
        self.temperature = chat.temperature;
        self.max_tokens = chat.max_tokens;
        self.context_builder = ContextBuilder::new(chat.context_max_chars, chat.preview_max_chars);
    }

    /// Replace the credential; `None` or empty means signed out.
    pub fn set_credential(&mut self, credential: Option<String>) {
        self.credential = credential.filter(|c| !c.is_empty());
    }

    /// Visible turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Current status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Whether a request is in flight.
    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Selected provider name.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Selected model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Short form of the selection for display.
    pub fn selection_preview(&self) -> String {
        self.context_builder.selection_preview(&self.selected_text)
    }

    /// Current state as an owned value.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            turns: self.turns.clone(),
            status: self.status.clone(),
            provider: self.provider.clone(),
            model: self.model.clone(),
        }
    }

    /// Receive a fresh [`Snapshot`] after every change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.updates.send_replace(self.snapshot());
        self.updates.subscribe()
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }

    /// Providers for the picker, in registry order.
    pub fn provider_options(&self) -> Vec<ProviderOption> {
        self.registry
            .list_providers()
            .into_iter()
            .map(|d| {
                let available = !d.auth_required || self.credential.is_some();
                let label = if available {
                    d.label
                } else {
                    format!("{} (Login Required)", d.label)
                };
                ProviderOption {
                    name: d.name,
                    label,
                    available,
                }
            })
            .collect()
    }

    /// Models of the selected provider; empty if the provider is unknown.
    pub fn model_options(&self) -> Vec<ModelInfo> {
        self.registry
            .get(&self.provider)
            .map(|p| p.models().to_vec())
            .unwrap_or_default()
    }

    /// Accept a user message.
    ///
    /// Returns `None` without touching any state when `text` is blank or a
    /// request is already in flight. Otherwise the trimmed text is appended
    /// as a user turn before anything else happens. If the provider is
    /// unknown or needs a login that is missing, the conversation moves to
    /// [`Status::Error`] and `None` is returned; no request is made.
    pub fn submit(&mut self, text: &str) -> Option<PendingReply> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.is_sending() {
            tracing::debug!("conversation: submit rejected, request in flight");
            return None;
        }

        let prior: Vec<Message> = self.turns.iter().map(Turn::to_message).collect();
        self.turns.push(Turn::user(text));

        let pending = match self.prepare(text, &prior) {
            Ok(pending) => pending,
            Err(e) => {
                tracing::warn!(provider = %self.provider, error = %e, "conversation: submit failed");
                self.status = Status::Error(e);
                self.publish();
                return None;
            }
        };

        tracing::debug!(
            request_id = %pending.request_id,
            provider = %self.provider,
            model = %self.model,
            turns = self.turns.len(),
            "conversation: request accepted"
        );
        self.in_flight = Some(pending.request_id);
        self.status = Status::Sending;
        self.publish();
        Some(pending)
    }

    fn prepare(&self, text: &str, prior: &[Message]) -> Result<PendingReply, ProviderError> {
        let provider = self
            .registry
            .get(&self.provider)
            .ok_or_else(|| ProviderError::UnknownProvider(self.provider.clone()))?;
        let credential =
            require_credential(provider.descriptor(), self.credential.as_deref())?.map(String::from);

        let context = self.context_builder.build(
            &self.book,
            self.view.as_deref(),
            &self.selected_text,
            self.page_text.as_deref(),
        );

        Ok(PendingReply {
            request_id: Uuid::now_v7(),
            provider,
            messages: prompt::assemble(&context, text, prior),
            options: RequestOptions {
                model: Some(self.model.clone()).filter(|m| !m.is_empty()),
                temperature: Some(self.temperature),
                max_tokens: Some(self.max_tokens),
            },
            credential,
        })
    }

    /// Apply the outcome of a request.
    ///
    /// Returns `false` and changes nothing if `reply` is not the request
    /// currently in flight (for instance after [`clear`](Self::clear)).
    pub fn finish(&mut self, reply: CompletedReply) -> bool {
        if self.in_flight != Some(reply.request_id) {
            tracing::debug!(request_id = %reply.request_id, "conversation: stale reply discarded");
            return false;
        }
        self.in_flight = None;

        match reply.result {
            Ok(text) => {
                tracing::debug!(request_id = %reply.request_id, "conversation: reply received");
                self.turns.push(Turn::assistant(text));
                self.status = Status::Idle;
            }
            Err(e) => {
                tracing::warn!(request_id = %reply.request_id, error = %e, "conversation: request failed");
                self.status = Status::Error(e);
            }
        }
        self.publish();
        true
    }

    /// Submit, await the provider and apply the outcome in one step.
    pub async fn send(&mut self, text: &str) -> &Status {
        if let Some(pending) = self.submit(text) {
            let completed = pending.run().await;
            self.finish(completed);
        }
        &self.status
    }

    /// Switch provider for future submissions.
    ///
    /// The model resets to the provider's first declared model. Turns are
    /// kept; an in-flight request is unaffected.
    pub fn change_provider(&mut self, name: &str) {
        self.select_provider(name);
        self.persist_preference();
        self.publish();
    }

    fn select_provider(&mut self, name: &str) {
        self.provider = name.to_string();
        match self.registry.get(name) {
            Some(provider) => {
                if let Some(first) = provider.models().first() {
                    self.model = first.id.clone();
                }
            }
            None => tracing::warn!(provider = %name, "conversation: switched to unknown provider"),
        }
    }

    /// Switch model for future submissions. Turns are kept.
    pub fn change_model(&mut self, id: &str) {
        self.model = id.to_string();
        self.persist_preference();
        self.publish();
    }

    /// Remove every turn and forget any in-flight request.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.in_flight = None;
        self.status = Status::Idle;
        self.publish();
    }

    fn persist_preference(&self) {
        let Some(ref store) = self.preferences else {
            return;
        };
        let preference = Preference::new(&self.provider, &self.model);
        if let Err(e) = store.save(&preference) {
            tracing::warn!(error = %e, "conversation: could not save preferences");
        }
    }
}
