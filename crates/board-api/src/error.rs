use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::debug;

use board_db::StoreError;
use board_types::ValidationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("template rendering failed: {0}")]
    Render(#[from] tera::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A user-facing failure: rendered through the `error.html` template with a
/// link back to where the user came from. `back_url` is emitted unescaped and
/// must only ever be built from server-side paths.
///
/// Handlers return it as their error type. Its `IntoResponse` only stashes
/// the page in the response extensions; `render::render_error_pages` turns
/// it into HTML, since rendering needs the shared templates.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub title: &'static str,
    pub message: String,
    pub back_url: String,
}

impl ErrorPage {
    pub fn new(
        status: StatusCode,
        title: &'static str,
        message: impl Into<String>,
        back_url: impl Into<String>,
    ) -> Self {
        Self {
            status,
            title,
            message: message.into(),
            back_url: back_url.into(),
        }
    }

    pub fn message_not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Message not found",
            "The requested message does not exist.",
            "/",
        )
    }

    pub fn forbidden(message: &str, back_url: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Permission denied", message, back_url)
    }

    pub fn invalid_input(err: &ValidationError, back_url: impl Into<String>) -> Self {
        let message = match err {
            ValidationError::EmptyField => "Title and content are required.".to_string(),
            ValidationError::TooLong { max } => {
                format!("Title and content must be at most {max} characters.")
            }
            ValidationError::EmptyQuery => "Enter something to search for.".to_string(),
        };
        Self::new(StatusCode::BAD_REQUEST, "Input error", message, back_url)
    }

    pub fn system(message: &str, back_url: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "System error", message, back_url)
    }
}

/// Unreadable form bodies (wrong content type, bad encoding) get the same
/// page as any other input error instead of axum's plain-text rejection.
impl From<FormRejection> for ErrorPage {
    fn from(rejection: FormRejection) -> Self {
        debug!("Rejected form body: {}", rejection.body_text());
        Self::new(
            StatusCode::BAD_REQUEST,
            "Input error",
            "The submitted form could not be read.",
            "/",
        )
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let mut res = self.status.into_response();
        res.extensions_mut().insert(self);
        res
    }
}
