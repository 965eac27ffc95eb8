//! Conversation engine for TruthGuard.
//!
//! [`ConversationEngine`] owns the live transcript and the current bias
//! report. It reaches the remote service through the coordinators in
//! [`AppContext`], which [`HttpBackend`] backs in production.

/// Network backends.
pub mod backends;
/// Bias analysis requests.
pub mod bias;
/// Service location and endpoint paths.
pub mod config;
/// Start-up wiring of shared services.
pub mod context;
/// Dialogue requests.
pub mod dialogue;
/// The conversation engine.
pub mod engine;

pub use backends::http::HttpBackend;
pub use backends::HealthResponse;
pub use bias::BiasCoordinator;
pub use config::{EndpointPaths, ServiceConfig};
pub use context::AppContext;
pub use dialogue::DialogueCoordinator;
pub use engine::{
    AnalysisOutcome, ConversationEngine, FactCheckOutcome, PendingSend, SendOutcome,
    FALLBACK_REPLY,
};
