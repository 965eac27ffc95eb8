use crate::auth::AuthSessionManager;
use crate::storage::{ConversationStorage, DurableStorage, EphemeralStorage, StorageKind};
use std::sync::Arc;
use tracing::info;
use truthguard_core::{AuthSession, ConversationService, Message, StoredConversation, TruthGuardResult};

/// Routes conversation reads and writes by authentication state.
///
/// Authenticated sessions go to the durable backend with the current token,
/// anonymous sessions to the session-scoped slot. The router holds no
/// conversation data of its own. Nothing is migrated between backends when
/// the session changes.
pub struct PersistenceRouter {
    auth: Arc<AuthSessionManager>,
    ephemeral: Arc<EphemeralStorage>,
    conversations: Arc<dyn ConversationService>,
}

impl PersistenceRouter {
    /// Routes between `ephemeral` and a durable store over `conversations`.
    pub fn new(
        auth: Arc<AuthSessionManager>,
        ephemeral: Arc<EphemeralStorage>,
        conversations: Arc<dyn ConversationService>,
    ) -> Self {
        Self {
            auth,
            ephemeral,
            conversations,
        }
    }

    /// The backend for the session as it is right now.
    pub async fn select(&self) -> Arc<dyn ConversationStorage> {
        let storage: Arc<dyn ConversationStorage> = match self.auth.current().await {
            AuthSession::Authenticated { token, .. } => {
                Arc::new(DurableStorage::new(self.conversations.clone(), token))
            }
            AuthSession::Anonymous => self.ephemeral.clone(),
        };
        storage
    }

    /// Saves `messages` and reports which backend took them.
    pub async fn save(&self, messages: &[Message]) -> TruthGuardResult<StorageKind> {
        let storage = self.select().await;
        storage.save(messages).await?;
        info!(backend = %storage.kind(), messages = messages.len(), "Conversation saved");
        Ok(storage.kind())
    }

    /// Lists conversations from the backend for the current session.
    pub async fn load(&self) -> TruthGuardResult<Vec<StoredConversation>> {
        let storage = self.select().await;
        let conversations = storage.load().await?;
        info!(
            backend = %storage.kind(),
            count = conversations.len(),
            "Conversations loaded"
        );
        Ok(conversations)
    }
}
