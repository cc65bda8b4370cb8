use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::State;
use axum::response::Response;
use axum::Form;
use http::StatusCode;
use serde::Deserialize;
use tracing::instrument;

use super::redirect_home;
use crate::http_server::error::AppError;
use crate::http_server::session::{ClientSession, Flash};
use crate::ServiceState;

pub const WELCOME: &str = "Welcome!";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const SIGNED_OUT: &str = "You have been signed out.";

#[derive(Template)]
#[template(path = "signin.html")]
pub struct SignInTemplate {
    pub flash: Flash,
    pub username: String,
}

#[derive(Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[instrument]
pub async fn signin_form(session: ClientSession) -> Result<Response, AppError> {
    let flash = session.take_flash().await?;

    let template = SignInTemplate {
        flash,
        username: String::new(),
    };

    Ok(template.into_response())
}

#[instrument(skip_all)]
pub async fn signin(
    State(state): State<ServiceState>,
    session: ClientSession,
    Form(form): Form<SignInForm>,
) -> Result<Response, AppError> {
    if state
        .credentials()
        .verify(&form.username, &form.password)
        .await
    {
        session.sign_in(&form.username).await?;
        session.flash_success(WELCOME).await?;
        tracing::info!(username = %form.username, "user signed in");
        return Ok(redirect_home());
    }

    tracing::warn!(username = %form.username, "failed sign in attempt");
    session.flash_error(INVALID_CREDENTIALS).await?;
    let flash = session.take_flash().await?;

    let template = SignInTemplate {
        flash,
        username: form.username,
    };

    Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
}

#[instrument]
pub async fn signout(session: ClientSession) -> Result<Response, AppError> {
    if let Some(username) = session.user().await? {
        tracing::info!(username = %username, "user signed out");
    }
    session.sign_out().await?;
    session.flash_success(SIGNED_OUT).await?;
    Ok(redirect_home())
}
