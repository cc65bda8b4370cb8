use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::State;
use axum::response::Response;
use axum::Form;
use common::document::DocumentError;
use http::StatusCode;
use serde::Deserialize;
use tracing::instrument;

use super::redirect_home;
use crate::http_server::auth::SignedIn;
use crate::http_server::error::AppError;
use crate::http_server::session::{ClientSession, Flash};
use crate::ServiceState;

pub const NAME_REQUIRED: &str = "A name is required.";

#[derive(Template)]
#[template(path = "new_document.html")]
pub struct NewDocumentTemplate {
    pub flash: Flash,
    pub new_filename: String,
}

#[derive(Debug, Deserialize)]
pub struct NewDocumentForm {
    #[serde(default)]
    pub new_filename: String,
}

#[instrument(skip_all)]
pub async fn form(signed_in: SignedIn) -> Result<Response, AppError> {
    let flash = signed_in.session.take_flash().await?;

    let template = NewDocumentTemplate {
        flash,
        new_filename: String::new(),
    };

    Ok(template.into_response())
}

#[instrument(skip(state, signed_in))]
pub async fn create(
    State(state): State<ServiceState>,
    signed_in: SignedIn,
    Form(form): Form<NewDocumentForm>,
) -> Result<Response, AppError> {
    let session = &signed_in.session;
    let name = form.new_filename;

    match state.documents().create(&name).await {
        Ok(()) => {
            session
                .flash_success(format!("{} has been created.", name))
                .await?;
            Ok(redirect_home())
        }
        Err(DocumentError::InvalidName) => reject(session, NAME_REQUIRED.to_string(), name).await,
        Err(DocumentError::OutsideRoot(_)) => {
            let message = format!("{} is not a valid document name.", name);
            reject(session, message, name).await
        }
        Err(e) => Err(e.into()),
    }
}

// re-render the form in place, the flash is consumed by this same response
async fn reject(
    session: &ClientSession,
    message: String,
    new_filename: String,
) -> Result<Response, AppError> {
    tracing::debug!(document = %new_filename, "rejecting new document: {}", message);
    session.flash_error(message).await?;
    let flash = session.take_flash().await?;

    let template = NewDocumentTemplate {
        flash,
        new_filename,
    };

    Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
}
