use crate::backends::http::HttpBackend;
use crate::bias::BiasCoordinator;
use crate::config::ServiceConfig;
use crate::dialogue::DialogueCoordinator;
use std::sync::Arc;
use truthguard_core::{AuthService, BiasService, ConversationService, DialogueService, TruthGuardResult};
use truthguard_session::{AuthSessionManager, CredentialStore, EphemeralStorage, PersistenceRouter};

/// The four remote capabilities, each behind its trait.
#[derive(Clone)]
pub struct Capabilities {
    /// Reply generation.
    pub dialogue: Arc<dyn DialogueService>,
    /// Bias analysis.
    pub bias: Arc<dyn BiasService>,
    /// Login and registration.
    pub auth: Arc<dyn AuthService>,
    /// Durable conversation storage.
    pub conversations: Arc<dyn ConversationService>,
}

impl Capabilities {
    /// All four served by one HTTP backend.
    pub fn http(backend: Arc<HttpBackend>) -> Self {
        Self {
            dialogue: backend.clone(),
            bias: backend.clone(),
            auth: backend.clone(),
            conversations: backend,
        }
    }
}

/// Shared services, built once at start-up and passed by reference to
/// whatever needs the session or storage.
#[derive(Clone)]
pub struct AppContext {
    auth: Arc<AuthSessionManager>,
    persistence: Arc<PersistenceRouter>,
    dialogue: Arc<DialogueCoordinator>,
    bias: Arc<BiasCoordinator>,
}

impl AppContext {
    /// Wires everything to the HTTP service described by `config`.
    pub fn http(config: ServiceConfig, credentials: Arc<dyn CredentialStore>) -> TruthGuardResult<Self> {
        let backend = Arc::new(HttpBackend::new(config)?);
        Ok(Self::from_parts(Capabilities::http(backend), credentials))
    }

    /// Wires the given capabilities; used with fakes in tests.
    pub fn from_parts(capabilities: Capabilities, credentials: Arc<dyn CredentialStore>) -> Self {
        let auth = Arc::new(AuthSessionManager::new(capabilities.auth, credentials));
        let persistence = Arc::new(PersistenceRouter::new(
            auth.clone(),
            Arc::new(EphemeralStorage::new()),
            capabilities.conversations,
        ));
        Self {
            auth,
            persistence,
            dialogue: Arc::new(DialogueCoordinator::new(capabilities.dialogue)),
            bias: Arc::new(BiasCoordinator::new(capabilities.bias)),
        }
    }

    /// The auth session manager.
    pub fn auth(&self) -> &Arc<AuthSessionManager> {
        &self.auth
    }

    /// The persistence router.
    pub fn persistence(&self) -> &Arc<PersistenceRouter> {
        &self.persistence
    }

    /// The dialogue coordinator.
    pub fn dialogue(&self) -> &Arc<DialogueCoordinator> {
        &self.dialogue
    }

    /// The bias analysis coordinator.
    pub fn bias(&self) -> &Arc<BiasCoordinator> {
        &self.bias
    }
}
