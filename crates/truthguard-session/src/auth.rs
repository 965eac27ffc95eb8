use crate::credentials::{CredentialStore, StoredCredential};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use truthguard_core::{AuthGrant, AuthService, AuthSession, TruthGuardError, TruthGuardResult};

#[derive(Debug, Clone, Copy)]
enum AuthAction {
    Login,
    Register,
}

impl AuthAction {
    fn as_str(self) -> &'static str {
        match self {
            AuthAction::Login => "login",
            AuthAction::Register => "register",
        }
    }
}

/// Owns the [`AuthSession`] and the persisted credential.
///
/// Every transition takes the state write lock before touching the
/// credential store and releases it only after both agree, so other
/// components reading [`AuthSessionManager::current`] never see the two
/// out of step.
pub struct AuthSessionManager {
    service: Arc<dyn AuthService>,
    credentials: Arc<dyn CredentialStore>,
    state: RwLock<AuthSession>,
}

impl AuthSessionManager {
    /// Starts anonymous. Call [`restore`](Self::restore) to pick up a
    /// credential persisted by an earlier run.
    pub fn new(service: Arc<dyn AuthService>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            service,
            credentials,
            state: RwLock::new(AuthSession::Anonymous),
        }
    }

    /// Loads the persisted credential, if any, into the live session.
    ///
    /// An unparseable record is removed and the session starts anonymous.
    pub async fn restore(&self) -> TruthGuardResult<AuthSession> {
        let mut state = self.state.write().await;
        let stored = match self.credentials.load().await {
            Ok(stored) => stored,
            Err(TruthGuardError::Auth(reason)) => {
                warn!(reason = %reason, "Discarding unreadable credential");
                self.credentials.clear().await?;
                None
            }
            Err(e) => return Err(e),
        };
        *state = match stored {
            Some(StoredCredential { token, username }) => {
                info!(username = %username, "Restored persisted session");
                AuthSession::Authenticated { token, username }
            }
            None => AuthSession::Anonymous,
        };
        Ok(state.clone())
    }

    /// Snapshot of the current session.
    pub async fn current(&self) -> AuthSession {
        self.state.read().await.clone()
    }

    /// Shorthand for `current().is_authenticated()`.
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// Returns `true` on success. Failures leave the session unchanged.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.authenticate(AuthAction::Login, username, password)
            .await
    }

    /// Returns `true` on success. Failures leave the session unchanged.
    pub async fn register(&self, username: &str, password: &str) -> bool {
        self.authenticate(AuthAction::Register, username, password)
            .await
    }

    /// Drops the credential and returns to anonymous.
    ///
    /// If the persisted credential cannot be removed the session stays
    /// authenticated and the error is returned.
    pub async fn logout(&self) -> TruthGuardResult<()> {
        let mut state = self.state.write().await;
        self.credentials.clear().await?;
        if let Some(username) = state.username() {
            info!(username = %username, "Logged out");
        }
        *state = AuthSession::Anonymous;
        Ok(())
    }

    async fn authenticate(&self, action: AuthAction, username: &str, password: &str) -> bool {
        if username.trim().is_empty() || password.is_empty() {
            warn!(action = action.as_str(), "Username and password are required");
            return false;
        }

        let grant = match action {
            AuthAction::Login => self.service.login(username, password).await,
            AuthAction::Register => self.service.register(username, password).await,
        };

        let AuthGrant {
            access_token,
            username,
        } = match grant {
            Ok(grant) => grant,
            Err(e) => {
                warn!(action = action.as_str(), error = %e, "Authentication failed");
                return false;
            }
        };

        let credential = StoredCredential {
            token: access_token,
            username,
        };

        let mut state = self.state.write().await;
        if let Err(e) = self.credentials.save(&credential).await {
            warn!(action = action.as_str(), error = %e, "Failed to persist credential");
            return false;
        }
        info!(
            action = action.as_str(),
            username = %credential.username,
            "Authenticated"
        );
        *state = AuthSession::Authenticated {
            token: credential.token,
            username: credential.username,
        };
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use truthguard_core::TruthGuardError;

    /// Accepts any password except "wrong"; the token counts calls.
    struct FakeAuth {
        calls: AtomicUsize,
    }

    impl FakeAuth {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn grant(&self, username: &str, password: &str) -> TruthGuardResult<AuthGrant> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if password == "wrong" {
                return Err(TruthGuardError::Server {
                    status: 401,
                    message: "Invalid credentials".into(),
                });
            }
            Ok(AuthGrant {
                access_token: format!("token-{n}"),
                username: username.to_string(),
            })
        }
    }

    #[async_trait]
    impl AuthService for FakeAuth {
        async fn login(&self, username: &str, password: &str) -> TruthGuardResult<AuthGrant> {
            self.grant(username, password)
        }

        async fn register(&self, username: &str, password: &str) -> TruthGuardResult<AuthGrant> {
            self.grant(username, password)
        }
    }

    /// Save always fails.
    struct BrokenStore;

    #[async_trait]
    impl CredentialStore for BrokenStore {
        async fn load(&self) -> TruthGuardResult<Option<StoredCredential>> {
            Ok(None)
        }
        async fn save(&self, _credential: &StoredCredential) -> TruthGuardResult<()> {
            Err(TruthGuardError::Io(std::io::Error::other("disk full")))
        }
        async fn clear(&self) -> TruthGuardResult<()> {
            Err(TruthGuardError::Io(std::io::Error::other("read-only")))
        }
    }

    fn manager() -> (AuthSessionManager, Arc<MemoryCredentialStore>, Arc<FakeAuth>) {
        let auth = Arc::new(FakeAuth::new());
        let store = Arc::new(MemoryCredentialStore::new());
        (
            AuthSessionManager::new(auth.clone(), store.clone()),
            store,
            auth,
        )
    }

    #[tokio::test]
    async fn login_success_sets_session_and_persists() {
        let (mgr, store, _) = manager();
        assert!(mgr.login("ada", "pw").await);

        let session = mgr.current().await;
        assert_eq!(session.username(), Some("ada"));
        assert_eq!(session.token(), Some("token-0"));
        assert_eq!(
            store.snapshot(),
            Some(StoredCredential {
                token: "token-0".into(),
                username: "ada".into()
            })
        );
    }

    #[tokio::test]
    async fn login_failure_leaves_state_unchanged() {
        let (mgr, store, _) = manager();
        assert!(!mgr.login("ada", "wrong").await);
        assert_eq!(mgr.current().await, AuthSession::Anonymous);
        assert!(store.snapshot().is_none());

        assert!(mgr.login("ada", "pw").await);
        assert!(!mgr.login("bob", "wrong").await);
        assert_eq!(mgr.current().await.username(), Some("ada"));
        assert_eq!(store.snapshot().unwrap().username, "ada");
    }

    #[tokio::test]
    async fn latest_successful_login_wins() {
        let (mgr, store, _) = manager();
        assert!(mgr.login("ada", "pw").await);
        assert!(mgr.register("bob", "pw").await);

        let session = mgr.current().await;
        assert_eq!(session.username(), Some("bob"));
        assert_eq!(session.token(), Some("token-1"));
        assert_eq!(store.snapshot().unwrap().token, "token-1");
    }

    #[tokio::test]
    async fn blank_credentials_skip_network() {
        let (mgr, _, auth) = manager();
        assert!(!mgr.login("   ", "pw").await);
        assert!(!mgr.register("ada", "").await);
        assert_eq!(auth.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn logout_clears_both() {
        let (mgr, store, _) = manager();
        assert!(mgr.login("ada", "pw").await);
        mgr.logout().await.unwrap();
        assert_eq!(mgr.current().await, AuthSession::Anonymous);
        assert!(store.snapshot().is_none());
    }

    #[tokio::test]
    async fn persist_failure_reports_false() {
        let mgr = AuthSessionManager::new(Arc::new(FakeAuth::new()), Arc::new(BrokenStore));
        assert!(!mgr.login("ada", "pw").await);
        assert!(!mgr.is_authenticated().await);
    }

    #[tokio::test]
    async fn restore_picks_up_persisted_credential() {
        let store = Arc::new(MemoryCredentialStore::new());
        store
            .save(&StoredCredential {
                token: "old".into(),
                username: "ada".into(),
            })
            .await
            .unwrap();

        let mgr = AuthSessionManager::new(Arc::new(FakeAuth::new()), store);
        let restored = mgr.restore().await.unwrap();
        assert_eq!(restored.token(), Some("old"));
        assert!(mgr.is_authenticated().await);
    }
}
