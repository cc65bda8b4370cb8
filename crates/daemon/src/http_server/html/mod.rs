use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use common::document::{Document, DocumentError};
use http::header::LOCATION;
use http::StatusCode;

mod delete;
mod document;
mod editor;
mod index;
mod new_document;
mod users;

use super::error::AppError;
use super::session::ClientSession;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(index::handler))
        .route("/new", get(new_document::form).post(new_document::create))
        .route("/users/signin", get(users::signin_form).post(users::signin))
        .route("/users/signout", post(users::signout))
        .route("/:filename", get(document::handler).post(editor::update))
        .route("/:filename/edit", get(editor::form))
        .route("/:filename/delete", post(delete::handler))
        .with_state(state)
}

/// Every mutation and rejection lands back on the index.
pub fn redirect_home() -> Response {
    (StatusCode::FOUND, [(LOCATION, "/")]).into_response()
}

/// Outcome of looking up the document named in the path.
pub(super) enum Lookup {
    Found(Document),
    /// The client has been flashed and should be sent this response.
    Missing(Response),
}

/// Load `name`, or flash "<name> does not exist." and redirect home.
pub(super) async fn lookup(
    state: &ServiceState,
    session: &ClientSession,
    name: &str,
) -> Result<Lookup, AppError> {
    match state.documents().read(name).await {
        Ok(document) => Ok(Lookup::Found(document)),
        Err(
            DocumentError::NotFound(_) | DocumentError::InvalidName | DocumentError::OutsideRoot(_),
        ) => flash_missing(session, name).await.map(Lookup::Missing),
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn flash_missing(
    session: &ClientSession,
    name: &str,
) -> Result<Response, AppError> {
    tracing::debug!(document = name, "document does not exist");
    session
        .flash_error(format!("{} does not exist.", last_segment(name)))
        .await?;
    Ok(redirect_home())
}

// decoded path params may still carry separators
fn last_segment(name: &str) -> &str {
    name.rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(name)
}
