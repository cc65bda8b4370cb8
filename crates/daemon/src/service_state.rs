use common::prelude::{CredentialStore, DocumentError, DocumentStore};
use tower_sessions_sqlx_store::SqliteStore;

use crate::http_server::session::{self, SessionStoreError};
use crate::http_server::{SessionKey, SessionKeyError};
use crate::ServiceConfig;

/// Shared, cheaply cloned handles used by every request.
#[derive(Clone)]
pub struct State {
    documents: DocumentStore,
    credentials: CredentialStore,
    sessions: SqliteStore,
}

impl State {
    pub fn new(
        documents: DocumentStore,
        credentials: CredentialStore,
        sessions: SqliteStore,
    ) -> Self {
        Self {
            documents,
            credentials,
            sessions,
        }
    }

    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        let documents = DocumentStore::open(&config.data_dir).await?;
        tracing::info!(
            environment = ?config.environment,
            root = %documents.root().display(),
            "serving documents"
        );

        if !config.users_path.exists() {
            tracing::warn!(
                path = %config.users_path.display(),
                "credential file not found, nobody will be able to sign in"
            );
        }
        let credentials = CredentialStore::new(config.users_path.clone());

        let sessions = session::open_store(&config.sessions_path).await?;

        Ok(Self::new(documents, credentials, sessions))
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn sessions(&self) -> &SqliteStore {
        &self.sessions
    }
}

/// Resolve the cookie signing key for a service config.
pub fn session_key(config: &ServiceConfig) -> Result<SessionKey, StateSetupError> {
    match &config.session_secret {
        Some(secret) => Ok(SessionKey::from_secret(secret)?),
        None => {
            tracing::warn!("no session_secret configured, sessions will not survive a restart");
            Ok(SessionKey::generate())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("document store error: {0}")]
    Documents(#[from] DocumentError),
    #[error("session key error: {0}")]
    SessionKey(#[from] SessionKeyError),
    #[error("session store error: {0}")]
    Sessions(#[from] SessionStoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Environment;

    fn config(dir: &std::path::Path, session_secret: Option<String>) -> ServiceConfig {
        ServiceConfig {
            app_port: 0,
            session_secret,
            data_dir: dir.join("data"),
            users_path: dir.join("users.txt"),
            sessions_path: dir.join("sessions.db"),
            environment: Environment::Test,
            log_level: tracing::Level::DEBUG,
            log_dir: None,
        }
    }

    #[tokio::test]
    async fn test_from_config_creates_data_dir() {
        let temp = tempfile::tempdir().unwrap();
        let state = State::from_config(&config(temp.path(), None)).await.unwrap();

        assert!(temp.path().join("data").is_dir());
        assert!(state.documents().list().await.unwrap().is_empty());
        assert_eq!(state.credentials().path(), temp.path().join("users.txt"));
        assert!(temp.path().join("sessions.db").exists());
    }

    #[test]
    fn test_short_session_secret_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let result = session_key(&config(temp.path(), Some("short".to_string())));
        assert!(matches!(result, Err(StateSetupError::SessionKey(_))));
    }
}
