use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the remote service lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service root, e.g. `http://localhost:5000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Paths of the individual endpoints.
    #[serde(default)]
    pub endpoints: EndpointPaths,
}

/// Request paths, relative to `base_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointPaths {
    /// Reply generation.
    #[serde(default = "default_chat")]
    pub chat: String,
    /// Bias analysis.
    #[serde(default = "default_check_bias")]
    pub check_bias: String,
    /// Login.
    #[serde(default = "default_login")]
    pub login: String,
    /// Account registration.
    #[serde(default = "default_register")]
    pub register: String,
    /// Durable save, bearer-authenticated.
    #[serde(default = "default_save_chat")]
    pub save_chat: String,
    /// Durable list, bearer-authenticated.
    #[serde(default = "default_get_chats")]
    pub get_chats: String,
    /// Health probe.
    #[serde(default = "default_health")]
    pub health: String,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_chat() -> String {
    "/chat".to_string()
}

fn default_check_bias() -> String {
    "/check_bias".to_string()
}

fn default_login() -> String {
    "/auth/login".to_string()
}

fn default_register() -> String {
    "/auth/register".to_string()
}

fn default_save_chat() -> String {
    "/auth/save-chat".to_string()
}

fn default_get_chats() -> String {
    "/auth/get-chats".to_string()
}

fn default_health() -> String {
    "/test".to_string()
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            chat: default_chat(),
            check_bias: default_check_bias(),
            login: default_login(),
            register: default_register(),
            save_chat: default_save_chat(),
            get_chats: default_get_chats(),
            health: default_health(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            endpoints: EndpointPaths::default(),
        }
    }
}

impl ServiceConfig {
    /// Config pointing at `base_url` with every other field defaulted.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Joins `base_url` and `path` with exactly one slash between them.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// `request_timeout_secs` as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
