use axum::extract::{Path, State};
use axum::response::Response;
use common::document::DocumentError;
use tracing::instrument;

use super::{flash_missing, redirect_home};
use crate::http_server::auth::SignedIn;
use crate::http_server::error::AppError;
use crate::ServiceState;

#[instrument(skip(state, signed_in))]
pub async fn handler(
    State(state): State<ServiceState>,
    signed_in: SignedIn,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let session = &signed_in.session;
    let documents = state.documents();

    if !documents.exists(&filename).await {
        return flash_missing(session, &filename).await;
    }

    match documents.delete(&filename).await {
        Ok(()) => {}
        // removed by someone else in between
        Err(DocumentError::NotFound(_)) => return flash_missing(session, &filename).await,
        Err(e) => return Err(e.into()),
    }

    session
        .flash_success(format!("{} was deleted.", filename))
        .await?;
    Ok(redirect_home())
}
