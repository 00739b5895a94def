use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use thiserror::Error;

use super::digest::{digest, new_token, EntropyError};
use crate::config::StoredConfig;
use crate::storage::{self, StorageError};

#[derive(Debug, Error)]
pub enum GateError {
    #[error("failed to generate token: {0}")]
    Entropy(#[from] EntropyError),
    #[error("failed to save token: {0}")]
    Storage(#[from] StorageError),
}

/// Master-password check and bearer-token registry.
///
/// Holds the credential part of the configuration file behind its own lock,
/// independent of the task store. Tokens are only ever kept as digests.
#[derive(Debug)]
pub struct CredentialGate {
    credentials: RwLock<StoredConfig>,
    path: PathBuf,
}

impl CredentialGate {
    /// `path` is the configuration file that [`issue_token`](Self::issue_token)
    /// rewrites; `credentials` is its already loaded content.
    pub fn new(path: impl Into<PathBuf>, credentials: StoredConfig) -> Self {
        Self {
            credentials: RwLock::new(credentials),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        digest(candidate) == self.read().password_hash
    }

    pub fn verify_token(&self, candidate: &str) -> bool {
        let candidate_hash = digest(candidate);
        self.read()
            .token_hashes
            .iter()
            .any(|stored| *stored == candidate_hash)
    }

    /// Issues a new token and records its digest in the configuration file.
    ///
    /// The digest is only kept if the file was written; on a storage failure
    /// the in-memory set is restored and the token is never valid.
    pub fn issue_token(&self) -> Result<String, GateError> {
        let token = new_token()?;
        let token_hash = digest(&token);

        let mut credentials = self.credentials.write().unwrap_or_else(PoisonError::into_inner);
        credentials.token_hashes.push(token_hash);
        if let Err(err) = storage::write_json(&self.path, &*credentials) {
            credentials.token_hashes.pop();
            error!(
                "Failed to save token to {}: {}",
                self.path.display(),
                err
            );
            return Err(err.into());
        }

        info!(
            "Issued API token ({} active)",
            credentials.token_hashes.len()
        );
        Ok(token)
    }

    pub fn token_count(&self) -> usize {
        self.read().token_hashes.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoredConfig> {
        self.credentials.read().unwrap_or_else(PoisonError::into_inner)
    }
}
