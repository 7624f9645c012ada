//! Lectern core library.
//!
//! Provides the conversation controller for asking an LLM about a passage of
//! a book, the provider abstraction with OpenAI and Anthropic adapters, book
//! context assembly and prompt rendering.

pub mod config;
pub mod context;
pub mod conversation;
pub mod message;
pub mod preferences;
pub mod prompt;
pub mod provider;
pub mod text;

pub use config::{ChatConfig, Config, ConfigError};
pub use context::{BookContext, BookInfo, ContextBuilder, PageText, ReadingView, ViewError};
pub use conversation::{CompletedReply, Conversation, PendingReply, ProviderOption, Snapshot, Status};
pub use message::{Message, Role, Turn};
pub use preferences::{
    MemoryPreferenceStore, Preference, PreferenceError, PreferenceStore, TomlPreferenceStore,
};
pub use provider::{
    ErrorKind, LlmProvider, ModelInfo, ProviderDescriptor, ProviderError, ProviderRegistry,
    RequestOptions,
};
