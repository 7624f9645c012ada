//! Book context assembly.
//!
//! Builds a bounded [`BookContext`] snapshot from the open book, the live
//! reading view and the reader's selection. Building never fails: anything
//! the view cannot provide is left out.

use crate::config::{DEFAULT_CONTEXT_MAX_CHARS, DEFAULT_PREVIEW_MAX_CHARS};
use crate::text;

/// Title used when the book has none.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Author used when the book has none.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Metadata of the open book.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookInfo {
    /// Book title.
    pub title: Option<String>,
    /// Book author.
    pub author: Option<String>,
    /// Primary language (e.g., "en").
    pub language: Option<String>,
}

impl BookInfo {
    /// Create book metadata with title and author.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            author: Some(author.into()),
            language: None,
        }
    }

    /// Set the primary language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Failure while inspecting the reading view.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("reading view unavailable: {0}")]
pub struct ViewError(pub String);

/// Live state of the reader's view.
///
/// Both methods may fail; the context builder treats a failure as "unknown".
pub trait ReadingView: Send + Sync {
    /// Text of the currently rendered page, if any.
    fn current_page_text(&self) -> Result<Option<String>, ViewError>;

    /// Title of the current chapter or section, if known.
    fn current_chapter(&self) -> Result<Option<String>, ViewError> {
        Ok(None)
    }
}

/// A [`ReadingView`] backed by text held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    text: Option<String>,
    chapter: Option<String>,
}

impl PageText {
    /// View showing `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            chapter: None,
        }
    }

    /// Set the chapter title.
    #[must_use]
    pub fn with_chapter(mut self, chapter: impl Into<String>) -> Self {
        self.chapter = Some(chapter.into());
        self
    }
}

impl ReadingView for PageText {
    fn current_page_text(&self) -> Result<Option<String>, ViewError> {
        Ok(self.text.clone())
    }

    fn current_chapter(&self) -> Result<Option<String>, ViewError> {
        Ok(self.chapter.clone())
    }
}

/// Snapshot of book and page information injected into the system prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct BookContext {
    /// Book title, or [`UNKNOWN_TITLE`].
    pub book_title: String,
    /// Book author, or [`UNKNOWN_AUTHOR`].
    pub author: String,
    /// The reader's selection, truncated.
    pub selected_text: String,
    /// Current chapter title.
    pub current_chapter: Option<String>,
    /// Text around the selection, truncated.
    pub current_page_context: Option<String>,
    /// Primary language of the book.
    pub language: Option<String>,
}

/// Builds [`BookContext`] values with fixed size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextBuilder {
    max_chars: usize,
    preview_chars: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_MAX_CHARS, DEFAULT_PREVIEW_MAX_CHARS)
    }
}

impl ContextBuilder {
    /// Create a builder truncating context fields to `max_chars` and the
    /// selection preview to `preview_chars`.
    pub fn new(max_chars: usize, preview_chars: usize) -> Self {
        Self {
            max_chars,
            preview_chars,
        }
    }

    /// Character limit for selected text and page context.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Build a context snapshot.
    ///
    /// `page_text_override`, when non-empty, replaces whatever the view
    /// reports as the current page. View failures are logged and the
    /// affected field is omitted.
    ///
    /// # Examples
    ///
    /// ```
    /// use lectern_core::context::{BookInfo, ContextBuilder, PageText};
    ///
    /// let book = BookInfo::new("Moby-Dick", "Herman Melville");
    /// let view = PageText::new("Call me Ishmael. Some years ago...");
    /// let context = ContextBuilder::default().build(&book, Some(&view), "Ishmael", None);
    ///
    /// assert_eq!(context.book_title, "Moby-Dick");
    /// assert_eq!(context.selected_text, "Ishmael");
    /// assert!(context.current_page_context.unwrap().starts_with("Call me"));
    /// ```
    pub fn build(
        &self,
        book: &BookInfo,
        view: Option<&dyn ReadingView>,
        selected_text: &str,
        page_text_override: Option<&str>,
    ) -> BookContext {
        let mut page_context = view.and_then(|v| read_view("page text", v.current_page_text()));
        if let Some(text) = page_text_override.filter(|t| !t.is_empty()) {
            page_context = Some(text.to_string());
        }

        BookContext {
            book_title: non_empty(&book.title).unwrap_or(UNKNOWN_TITLE).to_string(),
            author: non_empty(&book.author).unwrap_or(UNKNOWN_AUTHOR).to_string(),
            selected_text: text::clip(selected_text, self.max_chars),
            current_chapter: view.and_then(|v| read_view("chapter", v.current_chapter())),
            current_page_context: page_context
                .filter(|t| !t.trim().is_empty())
                .map(|t| text::clip(&t, self.max_chars)),
            language: non_empty(&book.language).map(str::to_string),
        }
    }

    /// Short form of the selection for display above the conversation.
    pub fn selection_preview(&self, selected_text: &str) -> String {
        text::preview(selected_text, self.preview_chars)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn read_view<T>(field: &str, result: Result<Option<T>, ViewError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(field, error = %e, "context: could not read reading view");
            None
        }
    }
}
