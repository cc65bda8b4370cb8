use axum::response::{IntoResponse, Response};
use common::document::DocumentError;
use http::StatusCode;

/// Failures a page handler cannot recover from locally.
///
/// Expected conditions (missing documents, bad names, failed logins) are
/// turned into flash messages by the handlers themselves; whatever reaches
/// this type becomes a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("document error: {0}")]
    Document(#[from] DocumentError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Something went wrong.",
        )
            .into_response()
    }
}
