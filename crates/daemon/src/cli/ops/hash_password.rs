use clap::Args;

use common::credentials::{credential_line, hash_password, PasswordError};

/// Print a credential file line for a new account.
#[derive(Args, Debug, Clone)]
pub struct HashPassword {
    pub username: String,
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum HashPasswordError {
    #[error("username must be non-empty and must not contain ': ' or newlines")]
    InvalidUsername,
    #[error("failed to hash password: {0}")]
    Hash(#[from] PasswordError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for HashPassword {
    type Error = HashPasswordError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let username = self.username.trim();
        if username.is_empty() || username.contains(": ") || username.contains(['\n', '\r']) {
            return Err(HashPasswordError::InvalidUsername);
        }

        let hash = hash_password(&self.password)?;
        Ok(credential_line(username, &hash))
    }
}
