//! Core types and error definitions for TruthGuard.
//!
//! This crate provides the foundational types shared across all TruthGuard
//! crates: the error type, transcript messages, bias reports, stored
//! conversations, and the traits behind which the remote capabilities sit.
//!
//! # Main types
//!
//! - [`TruthGuardError`]: Unified error enum for all TruthGuard subsystems.
//! - [`TruthGuardResult`]: Convenience alias for `Result<T, TruthGuardError>`.
//! - [`Message`]: A single transcript entry with its [`Author`] and [`MessageStatus`].
//! - [`BiasReport`]: The outcome of one bias analysis, scored or failed.
//! - [`BiasBand`]: Five-level display classification of a bias score.
//! - [`StoredConversation`]: A titled transcript as held by a storage backend.
//! - [`AuthSession`]: Anonymous or authenticated session state.

/// Bias reports and score banding.
pub mod bias;
/// Traits for the remote dialogue, analysis, authentication and storage capabilities.
pub mod capability;
/// Stored conversations and title derivation.
pub mod conversation;
/// Error types.
pub mod error;
/// Transcript messages.
pub mod message;

pub use bias::{BiasBand, BiasOutcome, BiasReport, BiasScore, Sentiment};
pub use capability::{
    AuthGrant, AuthService, BiasAnalysis, BiasService, ConversationService, DialogueReply,
    DialogueService,
};
pub use conversation::{derive_title, StoredConversation, DEFAULT_TITLE, TITLE_MAX_CHARS};
pub use error::{TruthGuardError, TruthGuardResult};
pub use message::{Author, Message, MessageStatus};

use serde::{Deserialize, Serialize};

/// Authentication state of the running client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AuthSession {
    /// No credential is held.
    #[default]
    Anonymous,
    /// A bearer token was granted for `username`.
    Authenticated {
        /// Bearer token sent with durable-store requests.
        token: String,
        /// Name the server returned on login or registration.
        username: String,
    },
}

impl AuthSession {
    /// Returns true when a credential is held.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthSession::Authenticated { .. })
    }

    /// The bearer token, if authenticated.
    pub fn token(&self) -> Option<&str> {
        match self {
            AuthSession::Authenticated { token, .. } => Some(token),
            AuthSession::Anonymous => None,
        }
    }

    /// The username, if authenticated.
    pub fn username(&self) -> Option<&str> {
        match self {
            AuthSession::Authenticated { username, .. } => Some(username),
            AuthSession::Anonymous => None,
        }
    }
}
