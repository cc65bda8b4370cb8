use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::State;
use axum::response::Response;
use tracing::instrument;

use crate::http_server::error::AppError;
use crate::http_server::session::{ClientSession, Flash};
use crate::ServiceState;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub flash: Flash,
    pub username: String,
    pub documents: Vec<String>,
}

#[derive(Template)]
#[template(path = "not_signed_in.html")]
pub struct LandingTemplate {
    pub flash: Flash,
}

/// Document listing for signed-in users, a sign-in prompt for everyone else.
#[instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    session: ClientSession,
) -> Result<Response, AppError> {
    let flash = session.take_flash().await?;

    let Some(username) = session.user().await? else {
        return Ok(LandingTemplate { flash }.into_response());
    };

    let documents = state.documents().list().await?;

    let template = IndexTemplate {
        flash,
        username,
        documents,
    };

    Ok(template.into_response())
}
