//! Per-client session state
//!
//! The session carries one durable entry, the signed-in `user`, and two
//! one-shot flash entries, `error` and `success`. Flash entries are removed
//! as they are read by [`ClientSession::take_flash`], which every page that
//! renders through the layout calls exactly once.
//!
//! Records live in SQLite. A session that only exists to carry a flash for an
//! anonymous client gets the short [`SessionLifetime::anonymous`] expiry, and
//! [`purge_expired`] sweeps expired records on an interval, so clients that
//! drop their cookie do not leave state behind.

use std::fmt;
use std::path::Path;

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use time::Duration;
use tokio::sync::watch;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

pub const USER_KEY: &str = "user";
pub const ERROR_KEY: &str = "error";
pub const SUCCESS_KEY: &str = "success";

const SESSION_COOKIE_NAME: &str = "quire.sid";
const MIN_SECRET_LEN: usize = 64;

pub type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Key used to sign the session cookie.
#[derive(Clone)]
pub struct SessionKey(Key);

impl SessionKey {
    /// Build a key from a configured secret of at least 64 bytes.
    pub fn from_secret(secret: &str) -> Result<Self, SessionKeyError> {
        let bytes = secret.as_bytes();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(SessionKeyError::TooShort(bytes.len()));
        }
        Ok(Self(Key::from(bytes)))
    }

    /// A random key; sessions do not survive a restart.
    pub fn generate() -> Self {
        Self(Key::generate())
    }

    /// A fresh random secret suitable for the `session_secret` setting.
    pub fn generate_secret() -> String {
        Key::generate()
            .master()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionKeyError {
    #[error("session secret must be at least 64 bytes, got {0}")]
    TooShort(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Idle timeouts for the two kinds of session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLifetime {
    /// A session holding a signed-in `user`
    pub signed_in: Duration,
    /// A session that only carries a flash for an anonymous client
    pub anonymous: Duration,
}

impl Default for SessionLifetime {
    fn default() -> Self {
        Self {
            signed_in: Duration::days(7),
            anonymous: Duration::minutes(10),
        }
    }
}

/// Open (creating if needed) the session database at `path`.
pub async fn open_store(path: &Path) -> Result<SqliteStore, SessionStoreError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    let store = SqliteStore::new(pool);
    store.migrate().await?;
    tracing::debug!(path = %path.display(), "opened session store");
    Ok(store)
}

/// Delete expired session records every `period` until shutdown.
pub async fn purge_expired(
    store: SqliteStore,
    period: std::time::Duration,
    mut shutdown_rx: watch::Receiver<()>,
) {
    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = store.delete_expired().await {
                    tracing::warn!("failed to purge expired sessions: {}", e);
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }
}

/// Signed-cookie session layer over the SQLite store.
pub fn layer(
    store: SqliteStore,
    key: SessionKey,
    lifetime: SessionLifetime,
) -> SessionManagerLayer<SqliteStore, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(lifetime.signed_in))
        .with_signed(key.0)
}

/// One-shot messages shown on the next rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// The requesting client's session.
#[derive(Debug, Clone)]
pub struct ClientSession {
    session: Session,
    lifetime: SessionLifetime,
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientSession
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let lifetime = parts
            .extensions
            .get::<SessionLifetime>()
            .copied()
            .unwrap_or_default();
        Ok(Self { session, lifetime })
    }
}

impl ClientSession {
    /// Username of the signed-in user, if any
    pub async fn user(&self) -> SessionResult<Option<String>> {
        self.session.get::<String>(USER_KEY).await
    }

    pub async fn sign_in(&self, username: &str) -> SessionResult<()> {
        // new identity, new session id
        self.session.cycle_id().await?;
        self.session
            .set_expiry(Some(Expiry::OnInactivity(self.lifetime.signed_in)));
        self.session.insert(USER_KEY, username).await
    }

    pub async fn sign_out(&self) -> SessionResult<()> {
        self.session.remove::<String>(USER_KEY).await?;
        Ok(())
    }

    pub async fn flash_error(&self, message: impl Into<String>) -> SessionResult<()> {
        self.flash(ERROR_KEY, message.into()).await
    }

    pub async fn flash_success(&self, message: impl Into<String>) -> SessionResult<()> {
        self.flash(SUCCESS_KEY, message.into()).await
    }

    /// Read and clear any pending flash messages.
    pub async fn take_flash(&self) -> SessionResult<Flash> {
        Ok(Flash {
            error: self.session.remove::<String>(ERROR_KEY).await?,
            success: self.session.remove::<String>(SUCCESS_KEY).await?,
        })
    }

    async fn flash(&self, key: &str, message: String) -> SessionResult<()> {
        if self.user().await?.is_none() {
            self.session
                .set_expiry(Some(Expiry::OnInactivity(self.lifetime.anonymous)));
        }
        self.session.insert(key, message).await
    }
}
