// credentials/mod.rs - Credential Store seam
//
// The gateway never sees secret hashes. It asks a CredentialStore whether a
// (subject, secret) pair is acceptable and gets back a yes/no, or an error
// when the store itself cannot answer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod file_store;
pub mod static_store;

pub use bcrypt::DEFAULT_COST;
pub use file_store::FileCredentialStore;
pub use static_store::StaticCredentialStore;

/// bcrypt hash (cost 12) of a random secret nobody holds. Unknown subjects
/// are checked against it so they cost one full verification as well.
const DUMMY_HASH: &str = "$2b$12$PsYxWrk7hFPy/5vEPdRJAe4C9OV7eCdqYjr0DUxd.KlJzKWhVimz2";

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error("credential store returned malformed data: {0}")]
    Malformed(String),

    #[error("secret hashing failed: {0}")]
    Hashing(String),
}

/// System of record for subject/secret verification.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns `Ok(false)` for both an unknown subject and a wrong secret.
    async fn verify(&self, subject: &str, secret: &str) -> Result<bool, CredentialStoreError>;
}

/// One stored credential as it appears in a credentials file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialRecord {
    pub subject: String,
    pub secret_hash: String,
}

/// Hash a plaintext secret into the bcrypt form the stores compare against.
pub fn hash_secret(secret: &str) -> Result<String, CredentialStoreError> {
    hash_secret_with_cost(secret, DEFAULT_COST)
}

pub fn hash_secret_with_cost(secret: &str, cost: u32) -> Result<String, CredentialStoreError> {
    bcrypt::hash(secret, cost).map_err(|e| CredentialStoreError::Hashing(e.to_string()))
}

/// bcrypt check of `secret` against the stored hash, or against
/// [`DUMMY_HASH`] when the subject has none. Blocking; run it off the
/// async workers.
fn secret_matches(stored: Option<&str>, secret: &str) -> bool {
    match stored {
        Some(hash) => bcrypt::verify(secret, hash).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored secret hash is not a usable bcrypt hash");
            false
        }),
        None => {
            let _ = bcrypt::verify(secret, DUMMY_HASH);
            false
        }
    }
}

pub(crate) async fn verify_on_blocking_pool(
    stored: Option<String>,
    secret: &str,
) -> Result<bool, CredentialStoreError> {
    let secret = secret.to_string();
    tokio::task::spawn_blocking(move || secret_matches(stored.as_deref(), &secret))
        .await
        .map_err(|e| CredentialStoreError::Unavailable(format!("verification task failed: {}", e)))
}

/// Cheapest cost bcrypt accepts.
#[cfg(test)]
pub(crate) const TEST_COST: u32 = 4;

/// Store holding u1/s1, hashed at the cheapest cost so tests stay quick.
#[cfg(test)]
pub(crate) fn test_store() -> StaticCredentialStore {
    let hash = hash_secret_with_cost("s1", TEST_COST).unwrap();
    StaticCredentialStore::new().with_hash("u1", hash)
}
