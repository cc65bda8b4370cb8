use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::{Path, State};
use axum::response::Response;
use common::document::Format;
use http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use tracing::instrument;

use super::{lookup, Lookup};
use crate::http_server::error::AppError;
use crate::http_server::session::{ClientSession, Flash};
use crate::ServiceState;

#[derive(Template)]
#[template(path = "document.html")]
pub struct DocumentTemplate {
    pub flash: Flash,
    pub name: String,
    pub body: String,
}

/// Show a document. Open to everyone.
#[instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    session: ClientSession,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let document = match lookup(&state, &session, &filename).await? {
        Lookup::Found(document) => document,
        Lookup::Missing(redirect) => return Ok(redirect),
    };

    match document.format {
        Format::Markdown => {
            let flash = session.take_flash().await?;
            let body = markdown_to_html(&document.text());
            let template = DocumentTemplate {
                flash,
                name: document.name,
                body,
            };
            Ok(template.into_response())
        }
        Format::PlainText | Format::Raw => {
            let content_type = document.format.content_type(&document.name);
            Ok((
                [
                    (CONTENT_TYPE, content_type),
                    (X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
                ],
                document.content,
            )
                .into_response())
        }
    }
}

/// Render markdown to an HTML fragment for embedding in a page.
pub fn markdown_to_html(markdown: &str) -> String {
    use pulldown_cmark::{html, Options, Parser};

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}
