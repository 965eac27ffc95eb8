//! JSON request and response bodies of the remote service.

use serde::{Deserialize, Serialize};
use truthguard_core::Message;

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub ai_response: String,
    #[serde(default)]
    pub fake_alert: bool,
}

#[derive(Debug, Serialize)]
pub struct BiasRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SentimentBody {
    pub polarity: f64,
    pub subjectivity: f64,
}

#[derive(Debug, Deserialize)]
pub struct BiasResponse {
    pub bias_score: f64,
    pub level: String,
    #[serde(default)]
    pub biased_phrases: Vec<String>,
    #[serde(default)]
    pub sentiment: Option<SentimentBody>,
    #[serde(default)]
    pub text_analyzed: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct SaveChatRequest<'a> {
    pub messages: &'a [Message],
    pub title: &'a str,
}

/// Health probe answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    /// Free-form status text.
    pub status: String,
}

/// Failure body: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Extracts the server's message from a failure body, falling back to the
/// raw text (or a placeholder when the body is empty).
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
