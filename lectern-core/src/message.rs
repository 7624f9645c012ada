//! Message types for book conversations.
//!
//! Provides the [`Role`] enum and [`Message`] struct that every provider
//! consumes, and the UI-facing [`Turn`] record the conversation keeps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions for the model.
    System,
    /// User input.
    User,
    /// Model response.
    Assistant,
}

impl Role {
    /// Wire name of the role, as used by every supported provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single canonical message sent to or received from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of this message.
    pub role: Role,
    /// The text content of this message.
    pub content: String,
}

impl Message {
    /// Create a new message with the given role and content.
    ///
    /// # Examples
    ///
    /// ```
    /// use lectern_core::message::{Message, Role};
    ///
    /// let msg = Message::new(Role::User, "Who is the narrator?");
    /// assert_eq!(msg.role, Role::User);
    /// assert_eq!(msg.content, "Who is the narrator?");
    /// ```
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// One rendered entry of the visible conversation.
///
/// A turn is a [`Message`] plus presentation metadata. Turns are created by
/// the conversation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    /// Time-sortable identifier (UUID v7).
    pub id: Uuid,
    /// Either [`Role::User`] or [`Role::Assistant`].
    pub role: Role,
    /// Text shown to the reader.
    pub content: String,
    /// When the turn was created.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a user turn stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant turn stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// The canonical message this turn stands for.
    pub fn to_message(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }
}
