use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use common::document::DocumentError;
use serde::Deserialize;
use tracing::instrument;

use super::{lookup, redirect_home, Lookup};
use crate::http_server::auth::SignedIn;
use crate::http_server::error::AppError;
use crate::http_server::session::Flash;
use crate::ServiceState;

#[derive(Template)]
#[template(path = "edit_document.html")]
pub struct EditDocumentTemplate {
    pub flash: Flash,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub file_content: String,
}

/// Edit form, pre-filled with the current content.
#[instrument(skip(state, signed_in))]
pub async fn form(
    State(state): State<ServiceState>,
    signed_in: SignedIn,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let session = &signed_in.session;
    let document = match lookup(&state, session, &filename).await? {
        Lookup::Found(document) => document,
        Lookup::Missing(redirect) => return Ok(redirect),
    };

    let flash = session.take_flash().await?;
    let template = EditDocumentTemplate {
        flash,
        content: document.text().into_owned(),
        name: document.name,
    };

    Ok(template.into_response())
}

/// Replace the content of a document, creating it if it is absent.
#[instrument(skip(state, signed_in, form))]
pub async fn update(
    State(state): State<ServiceState>,
    signed_in: SignedIn,
    Path(filename): Path<String>,
    Form(form): Form<UpdateForm>,
) -> Result<Response, AppError> {
    let session = &signed_in.session;

    match state
        .documents()
        .write(&filename, form.file_content.as_bytes())
        .await
    {
        Ok(()) => {
            session
                .flash_success(format!("{} has been updated.", filename))
                .await?;
        }
        Err(DocumentError::InvalidName | DocumentError::OutsideRoot(_)) => {
            tracing::warn!(document = %filename, user = %signed_in.username, "refusing update");
            session
                .flash_error(format!("{} is not a valid document name.", filename))
                .await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(redirect_home())
}
