use super::wire::{
    error_message, BiasRequest, BiasResponse, ChatRequest, ChatResponse, CredentialsRequest,
    HealthResponse, SaveChatRequest, TokenResponse,
};
use crate::config::ServiceConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use truthguard_core::{
    AuthGrant, AuthService, BiasAnalysis, BiasService, ConversationService, DialogueReply,
    DialogueService, Message, StoredConversation, TruthGuardError, TruthGuardResult,
};

/// JSON-over-HTTP client for the TruthGuard service.
///
/// One attempt per call. Transport failures map to
/// [`TruthGuardError::Http`], non-2xx answers to [`TruthGuardError::Server`]
/// carrying the body's `error` text.
pub struct HttpBackend {
    config: ServiceConfig,
    http: reqwest::Client,
}

impl HttpBackend {
    /// Builds the client with the configured request timeout.
    pub fn new(config: ServiceConfig) -> TruthGuardResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TruthGuardError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// The configuration this backend was built with.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Probes the service's health endpoint.
    pub async fn health(&self) -> TruthGuardResult<HealthResponse> {
        let request = self.http.get(self.config.url(&self.config.endpoints.health));
        let resp = self.send(request).await?;
        decode(resp).await
    }

    async fn post_json<B, R>(&self, path: &str, body: &B, token: Option<&str>) -> TruthGuardResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resp = self.post(path, body, token).await?;
        decode(resp).await
    }

    async fn post<B>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> TruthGuardResult<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.config.url(path);
        debug!(url = %url, "POST");
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> TruthGuardResult<reqwest::Response> {
        let resp = request
            .send()
            .await
            .map_err(|e| TruthGuardError::Http(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(TruthGuardError::Server {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

async fn decode<R: DeserializeOwned>(resp: reqwest::Response) -> TruthGuardResult<R> {
    resp.json()
        .await
        .map_err(|e| TruthGuardError::Http(format!("Malformed response body: {e}")))
}

#[async_trait]
impl DialogueService for HttpBackend {
    async fn generate_reply(&self, message: &str) -> TruthGuardResult<DialogueReply> {
        let resp: ChatResponse = self
            .post_json(&self.config.endpoints.chat, &ChatRequest { message }, None)
            .await?;
        Ok(DialogueReply {
            text: resp.ai_response,
            fake_alert: resp.fake_alert,
        })
    }
}

#[async_trait]
impl BiasService for HttpBackend {
    async fn analyze(&self, text: &str) -> TruthGuardResult<BiasAnalysis> {
        let resp: BiasResponse = self
            .post_json(&self.config.endpoints.check_bias, &BiasRequest { text }, None)
            .await?;
        Ok(BiasAnalysis {
            score: resp.bias_score,
            level: resp.level,
            biased_phrases: resp.biased_phrases.into_iter().collect(),
            sentiment: resp.sentiment.map(|s| (s.polarity, s.subjectivity)),
            text_analyzed: resp.text_analyzed.unwrap_or_else(|| text.to_string()),
        })
    }
}

#[async_trait]
impl AuthService for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> TruthGuardResult<AuthGrant> {
        let resp: TokenResponse = self
            .post_json(
                &self.config.endpoints.login,
                &CredentialsRequest { username, password },
                None,
            )
            .await?;
        Ok(AuthGrant {
            access_token: resp.access_token,
            username: resp.username,
        })
    }

    async fn register(&self, username: &str, password: &str) -> TruthGuardResult<AuthGrant> {
        let resp: TokenResponse = self
            .post_json(
                &self.config.endpoints.register,
                &CredentialsRequest { username, password },
                None,
            )
            .await?;
        Ok(AuthGrant {
            access_token: resp.access_token,
            username: resp.username,
        })
    }
}

#[async_trait]
impl ConversationService for HttpBackend {
    async fn save_conversation(
        &self,
        token: &str,
        title: &str,
        messages: &[Message],
    ) -> TruthGuardResult<()> {
        // Any 2xx is an ack; the body is not inspected.
        self.post(
            &self.config.endpoints.save_chat,
            &SaveChatRequest { messages, title },
            Some(token),
        )
        .await?;
        Ok(())
    }

    async fn list_conversations(&self, token: &str) -> TruthGuardResult<Vec<StoredConversation>> {
        let url = self.config.url(&self.config.endpoints.get_chats);
        debug!(url = %url, "GET");
        let resp = self.send(self.http.get(&url).bearer_auth(token)).await?;
        decode(resp).await
    }
}
