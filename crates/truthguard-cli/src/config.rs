use serde::Deserialize;
use std::path::{Path, PathBuf};
use truthguard_engine::ServiceConfig;

/// Environment variable that overrides `service.base_url`.
pub const BASE_URL_ENV: &str = "TRUTHGUARD_BASE_URL";

#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl ClientConfig {
    /// Reads `path` as TOML. A missing file yields the defaults.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(Self::default());
        }
        let config_str = tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        Ok(toml::from_str(&config_str)?)
    }

    /// Applies overrides in increasing precedence: environment, then flags.
    pub fn with_overrides(
        mut self,
        env_base_url: Option<String>,
        base_url: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(url) = env_base_url.filter(|u| !u.trim().is_empty()) {
            self.service.base_url = url;
        }
        if let Some(url) = base_url {
            self.service.base_url = url;
        }
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }
}
