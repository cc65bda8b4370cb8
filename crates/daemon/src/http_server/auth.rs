use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use http::request::Parts;

use super::error::AppError;
use super::html::redirect_home;
use super::session::ClientSession;

pub const SIGN_IN_REQUIRED: &str = "You must be signed in to do that.";

/// Extractor for routes that need a signed-in user.
///
/// Without a `user` in the session the request never reaches the handler:
/// the client is sent home with an error flash.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub username: String,
    pub session: ClientSession,
}

#[async_trait]
impl<S> FromRequestParts<S> for SignedIn
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = ClientSession::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let user = session
            .user()
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        match user {
            Some(username) => Ok(Self { username, session }),
            None => {
                tracing::debug!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    "rejecting unauthenticated request"
                );
                session
                    .flash_error(SIGN_IN_REQUIRED)
                    .await
                    .map_err(|e| AppError::from(e).into_response())?;
                Err(redirect_home())
            }
        }
    }
}
