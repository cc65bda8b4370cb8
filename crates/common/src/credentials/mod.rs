//! Flat-file credential checks
//!
//! The credential file holds one account per line:
//!
//! ```text
//! admin: $argon2id$v=19$m=19456,t=2,p=1$...
//! ```
//!
//! The file is re-read on every [`CredentialStore::verify`] call, so accounts
//! provisioned out-of-band take effect without a restart. There is no write
//! path through this module.

mod password;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use password::{hash_password, verify_password, PasswordError};

const DELIMITER: &str = ": ";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to read credential file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check a login attempt.
    ///
    /// Any failure (missing file, unknown user, malformed hash, wrong
    /// password) is reported as `false`.
    pub async fn verify(&self, username: &str, password: &str) -> bool {
        let records = match self.load().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("credential lookup failed: {}", e);
                return false;
            }
        };

        let Some(hash) = records.get(username).cloned() else {
            tracing::debug!(username, "no credential record for user");
            return false;
        };

        let password = password.to_owned();
        let verified =
            tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await;

        match verified {
            Ok(Ok(valid)) => valid,
            Ok(Err(e)) => {
                tracing::warn!(username, "unusable credential record: {}", e);
                false
            }
            Err(e) => {
                tracing::error!("password verification task failed: {}", e);
                false
            }
        }
    }

    async fn load(&self) -> Result<HashMap<String, String>, CredentialError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CredentialError::Read {
                path: self.path.clone(),
                source,
            })?;
        Ok(parse_records(&contents))
    }
}

/// Build the username → hash table. Later lines replace earlier ones.
fn parse_records(contents: &str) -> HashMap<String, String> {
    let mut records = HashMap::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((username, hash)) = line.split_once(DELIMITER) else {
            tracing::debug!(line = index + 1, "skipping malformed credential line");
            continue;
        };
        if records
            .insert(username.trim().to_string(), hash.trim().to_string())
            .is_some()
        {
            tracing::warn!(
                username = username.trim(),
                line = index + 1,
                "duplicate credential record, later entry wins"
            );
        }
    }

    records
}

/// Format a line for the credential file.
pub fn credential_line(username: &str, hash: &str) -> String {
    format!("{}{}{}", username, DELIMITER, hash)
}
