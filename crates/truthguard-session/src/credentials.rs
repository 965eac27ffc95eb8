use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use truthguard_core::{TruthGuardError, TruthGuardResult};

/// The durable credential record. Present if and only if authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Bearer token.
    pub token: String,
    /// Name the token was granted to.
    pub username: String,
}

/// Where the credential record lives between runs.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `None` when no record exists.
    async fn load(&self) -> TruthGuardResult<Option<StoredCredential>>;
    /// Replaces any existing record.
    async fn save(&self, credential: &StoredCredential) -> TruthGuardResult<()>;
    /// Removes the record. Succeeds if there is none.
    async fn clear(&self) -> TruthGuardResult<()>;
}

/// Credential file on disk (JSON). Survives process restarts.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Keeps `credentials.json` in `dir`, creating the directory.
    pub async fn new(dir: PathBuf) -> TruthGuardResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            path: dir.join("credentials.json"),
        })
    }

    /// Location of the credential file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> TruthGuardResult<Option<StoredCredential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(&self.path).await?;
        let credential: StoredCredential = serde_json::from_str(&data)
            .map_err(|e| TruthGuardError::Auth(format!("Failed to parse credentials: {e}")))?;
        Ok(Some(credential))
    }

    async fn save(&self, credential: &StoredCredential) -> TruthGuardResult<()> {
        let json = serde_json::to_string_pretty(credential)?;
        // Readers never observe a half-written token file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> TruthGuardResult<()> {
        if self.path.exists() {
            tokio::fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}

/// In-process credential slot, for tests and for runs without a data dir.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<StoredCredential>>,
}

impl MemoryCredentialStore {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents without going through the async trait.
    pub fn snapshot(&self) -> Option<StoredCredential> {
        self.slot.lock().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> TruthGuardResult<Option<StoredCredential>> {
        Ok(self.slot.lock().clone())
    }

    async fn save(&self, credential: &StoredCredential) -> TruthGuardResult<()> {
        *self.slot.lock() = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> TruthGuardResult<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}
