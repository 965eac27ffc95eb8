use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use truthguard_core::{
    derive_title, ConversationService, Message, StoredConversation, TruthGuardError,
    TruthGuardResult,
};

/// Id reported for the single conversation held by [`EphemeralStorage`].
pub const GUEST_CONVERSATION_ID: &str = "guest";

/// Which backend served a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Session-scoped, in memory.
    Ephemeral,
    /// Server-side, per account.
    Durable,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Ephemeral => f.write_str("ephemeral"),
            StorageKind::Durable => f.write_str("durable"),
        }
    }
}

/// A place conversations can be saved to and loaded from.
#[async_trait]
pub trait ConversationStorage: Send + Sync {
    /// Which kind of backend this is.
    fn kind(&self) -> StorageKind;
    /// Stores one transcript.
    async fn save(&self, messages: &[Message]) -> TruthGuardResult<()>;
    /// Lists stored conversations.
    async fn load(&self) -> TruthGuardResult<Vec<StoredConversation>>;
}

/// Session-scoped slot holding one serialized transcript.
///
/// Lives only as long as the process; nothing is written to disk.
#[derive(Default)]
pub struct EphemeralStorage {
    current: Mutex<Option<String>>,
}

impl EphemeralStorage {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the stored transcript.
    pub fn clear(&self) {
        *self.current.lock() = None;
    }
}

#[async_trait]
impl ConversationStorage for EphemeralStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::Ephemeral
    }

    async fn save(&self, messages: &[Message]) -> TruthGuardResult<()> {
        let json = serde_json::to_string(messages)?;
        *self.current.lock() = Some(json);
        debug!(messages = messages.len(), "Saved transcript to session storage");
        Ok(())
    }

    async fn load(&self) -> TruthGuardResult<Vec<StoredConversation>> {
        let Some(json) = self.current.lock().clone() else {
            return Ok(Vec::new());
        };
        let messages: Vec<Message> = serde_json::from_str(&json)
            .map_err(|e| TruthGuardError::Storage(format!("Corrupt session transcript: {e}")))?;
        Ok(vec![StoredConversation::new(GUEST_CONVERSATION_ID, messages)])
    }
}

/// Server-side storage bound to one bearer token.
pub struct DurableStorage {
    service: Arc<dyn ConversationService>,
    token: String,
}

impl DurableStorage {
    /// Binds `service` to `token`.
    pub fn new(service: Arc<dyn ConversationService>, token: impl Into<String>) -> Self {
        Self {
            service,
            token: token.into(),
        }
    }
}

#[async_trait]
impl ConversationStorage for DurableStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::Durable
    }

    async fn save(&self, messages: &[Message]) -> TruthGuardResult<()> {
        let title = derive_title(messages);
        debug!(messages = messages.len(), title = %title, "Saving transcript to durable store");
        self.service
            .save_conversation(&self.token, &title, messages)
            .await
    }

    async fn load(&self) -> TruthGuardResult<Vec<StoredConversation>> {
        self.service.list_conversations(&self.token).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ephemeral_empty_loads_nothing() {
        let store = EphemeralStorage::new();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ephemeral_keeps_only_latest() {
        let store = EphemeralStorage::new();
        store.save(&[Message::user("first")]).await.unwrap();
        store
            .save(&[Message::user("second"), Message::assistant("reply")])
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, GUEST_CONVERSATION_ID);
        assert_eq!(loaded[0].title, "second");
        assert_eq!(loaded[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn ephemeral_clear() {
        let store = EphemeralStorage::new();
        store.save(&[Message::user("x")]).await.unwrap();
        store.clear();
        assert!(store.load().await.unwrap().is_empty());
    }
}
