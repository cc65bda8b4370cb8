//! Shared helpers for driving the HTTP surface without a listener
#![allow(dead_code)]

use axum::body::Body;
use axum::Router;
use http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use http::{HeaderMap, Method, Request, StatusCode};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::SqliteStore;

use ::common::credentials::{credential_line, hash_password, CredentialStore};
use ::common::document::DocumentStore;
use quire_daemon::http_server::{self, SessionKey, SessionLifetime};
use quire_daemon::ServiceState;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

/// A router over a temporary document directory, plus one client's cookie jar.
pub struct TestApp {
    pub router: Router,
    pub store: DocumentStore,
    sessions: SqliteStore,
    pool: SqlitePool,
    cookie: Option<String>,
    _temp_dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn assert_redirect_home(&self) {
        assert_eq!(self.status, StatusCode::FOUND, "body: {}", self.body);
        assert_eq!(self.location(), Some("/"));
    }
}

impl TestApp {
    /// Fresh app with a single `admin` / `secret` account.
    pub async fn new() -> Self {
        Self::with_lifetime(SessionLifetime::default()).await
    }

    pub async fn with_lifetime(lifetime: SessionLifetime) -> Self {
        let temp_dir = TempDir::new().unwrap();

        let users_path = temp_dir.path().join("users.txt");
        let line = credential_line(USERNAME, &hash_password(PASSWORD).unwrap());
        std::fs::write(&users_path, line + "\n").unwrap();

        let store = DocumentStore::open(temp_dir.path().join("data"))
            .await
            .unwrap();

        let options = SqliteConnectOptions::new()
            .filename(temp_dir.path().join("sessions.db"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .unwrap();
        let sessions = SqliteStore::new(pool.clone());
        sessions.migrate().await.unwrap();

        let state = ServiceState::new(
            store.clone(),
            CredentialStore::new(users_path),
            sessions.clone(),
        );
        let router = http_server::router(state, SessionKey::generate(), lifetime);

        Self {
            router,
            store,
            sessions,
            pool,
            cookie: None,
            _temp_dir: temp_dir,
        }
    }

    /// Seed a document directly on disk.
    pub async fn seed(&self, name: &str, content: &str) {
        self.store.write(name, content).await.unwrap();
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request(Method::GET, uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let request = self
            .request(Method::POST, uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn sign_in(&mut self) {
        let form = format!("username={}&password={}", USERNAME, PASSWORD);
        let response = self.post_form("/users/signin", &form).await;
        response.assert_redirect_home();
    }

    /// Sign in and swallow the welcome flash.
    pub async fn signed_in() -> Self {
        let mut app = Self::new().await;
        app.sign_in().await;
        app.get("/").await;
        app
    }

    /// Drop the session cookie, as if a new client connected.
    pub fn forget_cookie(&mut self) {
        self.cookie = None;
    }

    /// Present a previously captured `name=value` cookie.
    pub fn use_cookie(&mut self, cookie: String) {
        self.cookie = Some(cookie);
    }

    /// The `name=value` pair currently held in the cookie jar.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Session records currently in the store, expired or not.
    pub async fn session_records(&self) -> i64 {
        sqlx::query_scalar("select count(*) from tower_sessions")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn purge_expired_sessions(&self) {
        self.sessions.delete_expired().await.unwrap();
    }

    fn request(&self, method: Method, uri: &str) -> http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            // an empty value is the store dropping the session
            let cleared = pair.split_once('=').map_or(true, |(_, v)| v.is_empty());
            self.cookie = if cleared { None } else { Some(pair) };
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
