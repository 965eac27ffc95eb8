use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Title used when a transcript has no usable first message.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Titles are cut to this many characters.
pub const TITLE_MAX_CHARS: usize = 30;

/// Derives a conversation title from its first message.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn derive_title(messages: &[Message]) -> String {
    match messages.first() {
        Some(first) if !first.text().is_empty() => {
            first.text().chars().take(TITLE_MAX_CHARS).collect()
        }
        _ => DEFAULT_TITLE.to_string(),
    }
}

/// A titled transcript as held by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConversation {
    /// Backend-assigned identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Messages in chronological order.
    pub messages: Vec<Message>,
}

impl StoredConversation {
    /// Builds a conversation whose title is derived from `messages`.
    pub fn new(id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            id: id.into(),
            title: derive_title(&messages),
            messages,
        }
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the conversation has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_first_message() {
        let messages = vec![
            Message::user("Is the economy improving this quarter or not?"),
            Message::assistant("It depends."),
        ];
        assert_eq!(derive_title(&messages), "Is the economy improving this ");
        assert_eq!(derive_title(&messages).chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn test_title_short_message_kept_whole() {
        assert_eq!(derive_title(&[Message::user("Hi")]), "Hi");
    }

    #[test]
    fn test_title_defaults() {
        assert_eq!(derive_title(&[]), DEFAULT_TITLE);
        assert_eq!(derive_title(&[Message::user("")]), DEFAULT_TITLE);
    }

    #[test]
    fn test_title_counts_characters() {
        let text = "é".repeat(40);
        let title = derive_title(&[Message::user(text)]);
        assert_eq!(title.chars().count(), 30);
    }

    #[test]
    fn test_stored_conversation_new() {
        let conv = StoredConversation::new("guest", vec![Message::user("hello")]);
        assert_eq!(conv.title, "hello");
        assert_eq!(conv.len(), 1);
        assert!(!conv.is_empty());
    }
}
