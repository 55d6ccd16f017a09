use std::collections::HashMap;

use async_trait::async_trait;

use super::{verify_on_blocking_pool, CredentialRecord, CredentialStore, CredentialStoreError};

/// In-memory credential store keyed by subject.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    hashes: HashMap<String, String>,
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subject whose secret is already hashed (see [`super::hash_secret`]).
    pub fn with_hash(mut self, subject: impl Into<String>, secret_hash: impl Into<String>) -> Self {
        self.hashes.insert(subject.into(), secret_hash.into());
        self
    }

    pub fn from_records(records: impl IntoIterator<Item = CredentialRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::new(), |store, record| store.with_hash(record.subject, record.secret_hash))
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn verify(&self, subject: &str, secret: &str) -> Result<bool, CredentialStoreError> {
        verify_on_blocking_pool(self.hashes.get(subject).cloned(), secret).await
    }
}
