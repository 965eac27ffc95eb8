//! Remote capabilities the client orchestrates.
//!
//! These traits live in `truthguard-core` so that `truthguard-session`
//! (auth and durable storage) and `truthguard-engine` (dialogue and
//! analysis) can share them without depending on the HTTP backend.
//! Implementations return data; they never touch engine state.

use crate::conversation::StoredConversation;
use crate::message::Message;
use crate::TruthGuardResult;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// A reply from the dialogue capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueReply {
    /// Generated reply text.
    pub text: String,
    /// Whether the service's misinformation check fired for the prompt.
    pub fake_alert: bool,
}

/// A successful bias analysis as returned by the analysis capability.
#[derive(Debug, Clone, PartialEq)]
pub struct BiasAnalysis {
    /// Directional score.
    pub score: f64,
    /// Service-reported level.
    pub level: String,
    /// Phrases that contributed to the score.
    pub biased_phrases: BTreeSet<String>,
    /// `(polarity, subjectivity)` when reported.
    pub sentiment: Option<(f64, f64)>,
    /// Text the service says it analyzed.
    pub text_analyzed: String,
}

/// A granted credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    /// Bearer token.
    pub access_token: String,
    /// Canonical username.
    pub username: String,
}

/// Generates a reply to a single utterance.
#[async_trait]
pub trait DialogueService: Send + Sync {
    /// One request, one attempt.
    async fn generate_reply(&self, message: &str) -> TruthGuardResult<DialogueReply>;
}

/// Analyzes a single utterance for political bias.
#[async_trait]
pub trait BiasService: Send + Sync {
    /// One request, one attempt.
    async fn analyze(&self, text: &str) -> TruthGuardResult<BiasAnalysis>;
}

/// Grants bearer tokens.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchanges existing credentials for a token.
    async fn login(&self, username: &str, password: &str) -> TruthGuardResult<AuthGrant>;
    /// Creates an account and returns a token for it.
    async fn register(&self, username: &str, password: &str) -> TruthGuardResult<AuthGrant>;
}

/// Server-side conversation persistence for an authenticated user.
#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Saves one conversation under the token's identity.
    async fn save_conversation(
        &self,
        token: &str,
        title: &str,
        messages: &[Message],
    ) -> TruthGuardResult<()>;

    /// Lists every conversation the token's identity owns.
    async fn list_conversations(&self, token: &str) -> TruthGuardResult<Vec<StoredConversation>>;
}
