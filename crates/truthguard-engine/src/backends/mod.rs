//! Network backends for the remote capabilities.
//!
//! [`http::HttpBackend`] implements every capability trait from
//! `truthguard_core::capability` over one JSON/HTTP service. Other transports
//! plug in by implementing the same traits and handing them to
//! [`AppContext::from_parts`](crate::context::AppContext::from_parts).

/// JSON-over-HTTP implementation.
pub mod http;
pub(crate) mod wire;

pub use wire::HealthResponse;
