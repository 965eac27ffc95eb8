#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use truthguard_core::{
    AuthGrant, AuthService, ConversationService, Message, StoredConversation, TruthGuardError,
    TruthGuardResult,
};
use truthguard_session::{
    AuthSessionManager, EphemeralStorage, FileCredentialStore, MemoryCredentialStore,
    PersistenceRouter, StorageKind, GUEST_CONVERSATION_ID,
};

/// Grants `token-for-<username>` to anyone.
struct OpenAuth;

#[async_trait]
impl AuthService for OpenAuth {
    async fn login(&self, username: &str, _password: &str) -> TruthGuardResult<AuthGrant> {
        Ok(AuthGrant {
            access_token: format!("token-for-{username}"),
            username: username.to_string(),
        })
    }

    async fn register(&self, username: &str, password: &str) -> TruthGuardResult<AuthGrant> {
        self.login(username, password).await
    }
}

/// In-memory server-side store keyed by token.
#[derive(Default)]
struct FakeServer {
    saved: Mutex<Vec<(String, StoredConversation)>>,
}

#[async_trait]
impl ConversationService for FakeServer {
    async fn save_conversation(
        &self,
        token: &str,
        title: &str,
        messages: &[Message],
    ) -> TruthGuardResult<()> {
        let mut saved = self.saved.lock();
        let id = saved.len().to_string();
        saved.push((
            token.to_string(),
            StoredConversation {
                id,
                title: title.to_string(),
                messages: messages.to_vec(),
            },
        ));
        Ok(())
    }

    async fn list_conversations(&self, token: &str) -> TruthGuardResult<Vec<StoredConversation>> {
        if token.is_empty() {
            return Err(TruthGuardError::Server {
                status: 401,
                message: "Missing token".into(),
            });
        }
        Ok(self
            .saved
            .lock()
            .iter()
            .filter(|(t, _)| t == token)
            .map(|(_, c)| c.clone())
            .collect())
    }
}

struct Harness {
    auth: Arc<AuthSessionManager>,
    router: PersistenceRouter,
    server: Arc<FakeServer>,
}

fn harness() -> Harness {
    let auth = Arc::new(AuthSessionManager::new(
        Arc::new(OpenAuth),
        Arc::new(MemoryCredentialStore::new()),
    ));
    let server = Arc::new(FakeServer::default());
    let router = PersistenceRouter::new(
        auth.clone(),
        Arc::new(EphemeralStorage::new()),
        server.clone(),
    );
    Harness {
        auth,
        router,
        server,
    }
}

fn transcript() -> Vec<Message> {
    vec![
        Message::user("What do economists say about tariffs and prices?"),
        Message::assistant("Most expect prices to rise."),
    ]
}

#[tokio::test]
async fn anonymous_save_goes_to_session_storage() {
    let h = harness();
    let kind = h.router.save(&transcript()).await.unwrap();
    assert_eq!(kind, StorageKind::Ephemeral);
    assert!(h.server.saved.lock().is_empty());

    let loaded = h.router.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, GUEST_CONVERSATION_ID);
    assert_eq!(loaded[0].messages, transcript());
}

#[tokio::test]
async fn authenticated_round_trip() {
    let h = harness();
    assert!(h.auth.login("ada", "pw").await);

    let kind = h.router.save(&transcript()).await.unwrap();
    assert_eq!(kind, StorageKind::Durable);

    let saved = h.server.saved.lock().clone();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "token-for-ada");

    let loaded = h.router.load().await.unwrap();
    let conv = loaded
        .iter()
        .find(|c| c.messages == transcript())
        .expect("saved conversation listed");
    assert_eq!(conv.title, "What do economists say about t");
    assert_eq!(conv.title.chars().count(), 30);
}

#[tokio::test]
async fn logout_then_load_returns_session_conversation_only() {
    let h = harness();
    h.router.save(&[Message::user("guest chat")]).await.unwrap();

    assert!(h.auth.login("ada", "pw").await);
    h.router.save(&transcript()).await.unwrap();
    let durable = h.router.load().await.unwrap();
    assert_eq!(durable.len(), 1);
    assert_eq!(durable[0].messages, transcript());

    h.auth.logout().await.unwrap();
    let loaded = h.router.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, GUEST_CONVERSATION_ID);
    assert_eq!(loaded[0].title, "guest chat");
}

#[tokio::test]
async fn no_migration_on_login() {
    let h = harness();
    h.router.save(&[Message::user("before login")]).await.unwrap();
    assert!(h.auth.login("ada", "pw").await);

    assert!(h.router.load().await.unwrap().is_empty());
    assert!(h.server.saved.lock().is_empty());
}

#[tokio::test]
async fn empty_transcript_saves_with_default_title() {
    let h = harness();
    assert!(h.auth.login("ada", "pw").await);
    h.router.save(&[]).await.unwrap();
    assert_eq!(h.server.saved.lock()[0].1.title, "New Chat");
}

#[tokio::test]
async fn persisted_credential_restores_durable_routing() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("data");
    let server = Arc::new(FakeServer::default());

    {
        let auth = Arc::new(AuthSessionManager::new(
            Arc::new(OpenAuth),
            Arc::new(FileCredentialStore::new(dir.clone()).await.unwrap()),
        ));
        assert!(auth.login("ada", "pw").await);
        let router = PersistenceRouter::new(auth, Arc::new(EphemeralStorage::new()), server.clone());
        router.save(&transcript()).await.unwrap();
    }

    // A fresh process: new manager over the same credential file.
    let auth = Arc::new(AuthSessionManager::new(
        Arc::new(OpenAuth),
        Arc::new(FileCredentialStore::new(dir).await.unwrap()),
    ));
    assert!(auth.restore().await.unwrap().is_authenticated());
    let router = PersistenceRouter::new(auth, Arc::new(EphemeralStorage::new()), server);
    let loaded = router.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].messages, transcript());
}

#[tokio::test]
async fn corrupt_credential_file_is_discarded_on_restore() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Arc::new(FileCredentialStore::new(tmp.path().to_path_buf()).await.unwrap());
    tokio::fs::write(store.path(), "{ not json").await.unwrap();

    let auth = AuthSessionManager::new(Arc::new(OpenAuth), store.clone());
    let session = auth.restore().await.unwrap();

    assert!(!session.is_authenticated());
    assert!(!auth.is_authenticated().await);
    assert!(!store.path().exists());

    // A later login writes a fresh, readable record.
    assert!(auth.login("ada", "pw").await);
    assert!(store.path().exists());
}
