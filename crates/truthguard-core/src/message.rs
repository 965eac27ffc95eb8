use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a [`Message`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// The person typing into the client.
    User,
    /// The remote dialogue service.
    Assistant,
}

/// Delivery state of a [`Message`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Not yet settled.
    Pending,
    /// Delivered or received normally.
    Ok,
    /// The reply could not be produced; the text is a fallback.
    Error,
}

impl MessageStatus {
    /// Ok and Error are terminal.
    pub fn is_final(self) -> bool {
        !matches!(self, MessageStatus::Pending)
    }
}

/// A single entry of a conversation transcript.
///
/// Messages are only built through the constructors below and the fields
/// are read-only from outside the crate, so a message is immutable once
/// its status is final.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    text: String,
    author: Author,
    status: MessageStatus,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    misinformation_alert: bool,
}

impl Message {
    fn new(author: Author, status: MessageStatus, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            author,
            status,
            timestamp: Utc::now(),
            misinformation_alert: false,
        }
    }

    /// A user utterance, already delivered.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Author::User, MessageStatus::Ok, text)
    }

    /// A successful assistant reply.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Author::Assistant, MessageStatus::Ok, text)
    }

    /// An assistant placeholder carrying fallback text after a failed request.
    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self::new(Author::Assistant, MessageStatus::Error, text)
    }

    /// Marks the message as flagged by the service's misinformation check.
    pub fn with_misinformation_alert(mut self, flagged: bool) -> Self {
        self.misinformation_alert = flagged;
        self
    }

    /// Unique identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Message body.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Who wrote it.
    pub fn author(&self) -> Author {
        self.author
    }

    /// Delivery state.
    pub fn status(&self) -> MessageStatus {
        self.status
    }

    /// Creation time.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether the reply was flagged as potential misinformation.
    pub fn misinformation_alert(&self) -> bool {
        self.misinformation_alert
    }

    /// Shorthand for `author() == Author::User`.
    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

/// Two messages are equal when their visible content matches; ids and
/// timestamps are ignored so transcripts compare across a storage round trip.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.author == other.author
            && self.status == other.status
            && self.misinformation_alert == other.misinformation_alert
    }
}

impl Eq for Message {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.author(), Author::User);
        assert_eq!(msg.status(), MessageStatus::Ok);
        assert_eq!(msg.text(), "Hello");
        assert!(!msg.misinformation_alert());
    }

    #[test]
    fn test_assistant_error_status() {
        let msg = Message::assistant_error("fallback");
        assert_eq!(msg.author(), Author::Assistant);
        assert_eq!(msg.status(), MessageStatus::Error);
        assert!(msg.status().is_final());
        assert!(!MessageStatus::Pending.is_final());
    }

    #[test]
    fn test_message_wire_form() {
        let msg = Message::assistant("Hi").with_misinformation_alert(true);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["author"], "assistant");
        assert_eq!(json["status"], "ok");
        assert_eq!(json["text"], "Hi");
        assert_eq!(json["misinformation_alert"], true);
    }

    #[test]
    fn test_missing_alert_defaults_false() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "text": "hello",
            "author": "user",
            "status": "ok",
            "timestamp": Utc::now(),
        });
        let msg: Message = serde_json::from_value(json).unwrap();
        assert!(!msg.misinformation_alert());
        assert!(msg.is_user());
    }

    #[test]
    fn test_equality_ignores_identity() {
        assert_eq!(Message::user("same"), Message::user("same"));
        assert_ne!(Message::user("same"), Message::assistant("same"));
    }
}
