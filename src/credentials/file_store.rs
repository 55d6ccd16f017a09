use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CredentialRecord, CredentialStore, CredentialStoreError, StaticCredentialStore};

/// On-disk layout of the credentials file.
///
/// ```yaml
/// credentials:
///   - subject: u1
///     secret_hash: "$2b$12$..."
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialFile {
    #[serde(default)]
    pub credentials: Vec<CredentialRecord>,
}

/// YAML-backed credential store.
///
/// The file is read on every verification, so edits take effect without a
/// restart and a missing or broken file surfaces as an upstream failure
/// rather than a rejected login.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<StaticCredentialStore, CredentialStoreError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CredentialStoreError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let file: CredentialFile = serde_yaml::from_str(&content).map_err(|e| {
            CredentialStoreError::Malformed(format!("{}: {}", self.path.display(), e))
        })?;

        Ok(StaticCredentialStore::from_records(file.credentials))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn verify(&self, subject: &str, secret: &str) -> Result<bool, CredentialStoreError> {
        self.load().await?.verify(subject, secret).await
    }
}
