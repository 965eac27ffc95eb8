//! Session lifecycle for TruthGuard.
//!
//! [`AuthSessionManager`] owns the authenticated/anonymous state and keeps the
//! persisted credential in step with it. [`PersistenceRouter`] sends
//! conversation reads and writes to the ephemeral or durable backend
//! depending on that state.

/// Authentication state.
pub mod auth;
/// Credential persistence.
pub mod credentials;
/// Persistence routing.
pub mod router;
/// Conversation storage backends.
pub mod storage;

pub use auth::AuthSessionManager;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredential};
pub use router::PersistenceRouter;
pub use storage::{
    ConversationStorage, DurableStorage, EphemeralStorage, StorageKind, GUEST_CONVERSATION_ID,
};
