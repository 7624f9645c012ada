//! Prompt assembly.
//!
//! Renders the system prompt from a [`BookContext`] and builds the
//! canonical message list for a provider call.

use crate::context::BookContext;
use crate::message::{Message, Role};

const INTRODUCTION: &str = "You are a helpful AI assistant that answers questions about books \
and reading. You have context about the current book and page the user is reading.";

const INSTRUCTIONS: &str = "Please answer questions helpfully and accurately based on the book \
content and your knowledge. If the user asks about something not directly related to the \
selected text or book context, you can still provide helpful general information. Keep your \
responses concise but informative.";

/// Render the system prompt for a context.
///
/// Optional fields that are absent leave no trace: no header, no blank line.
pub fn system_prompt(context: &BookContext) -> String {
    let language = context
        .language
        .as_ref()
        .map(|language| format!("- Language: {language}\n"))
        .unwrap_or_default();
    let chapter = context
        .current_chapter
        .as_ref()
        .map(|chapter| format!("- Chapter: \"{chapter}\"\n"))
        .unwrap_or_default();
    let page = context
        .current_page_context
        .as_ref()
        .map(|page| format!("Current Page Context:\n\"{page}\"\n\n"))
        .unwrap_or_default();

    format!(
        "{INTRODUCTION}\n\nBook Information:\n\
         - Title: \"{title}\"\n\
         - Author: \"{author}\"\n\
         {language}{chapter}\n\
         Selected Text: \"{selected}\"\n\n\
         {page}{INSTRUCTIONS}",
        title = context.book_title,
        author = context.author,
        selected = context.selected_text,
    )
}

/// Build the canonical message list for one turn.
///
/// The result is one freshly rendered system message, then `prior` with
/// any system entries removed, then `user_message`. It is never empty and
/// always ends with the new user message.
///
/// # Examples
///
/// ```
/// use lectern_core::context::{BookInfo, ContextBuilder};
/// use lectern_core::message::{Message, Role};
/// use lectern_core::prompt::assemble;
///
/// let context = ContextBuilder::default().build(&BookInfo::default(), None, "a line", None);
/// let prior = [Message::new(Role::System, "stale"), Message::new(Role::User, "earlier")];
///
/// let messages = assemble(&context, "and now?", &prior);
/// assert_eq!(messages.len(), 3);
/// assert_eq!(messages[0].role, Role::System);
/// assert_eq!(messages[2].content, "and now?");
/// ```
pub fn assemble(context: &BookContext, user_message: &str, prior: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(prior.len() + 2);
    messages.push(Message::new(Role::System, system_prompt(context)));
    messages.extend(prior.iter().filter(|m| m.role != Role::System).cloned());
    messages.push(Message::new(Role::User, user_message));
    messages
}
