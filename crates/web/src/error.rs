use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use filmhub_core::error::CoreError;
use filmhub_db::DbError;
use minijinja::HtmlEscape;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`DbError`] and adds HTTP-specific variants.
/// Renders a small HTML error page; `Unauthorized` becomes a redirect to the
/// login page instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `filmhub_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store error from `filmhub_db`.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// A missing resource that is not addressed by id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A template failed to load or render.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, core.to_string()),
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::Unauthorized(msg) => {
                    tracing::debug!(reason = %msg, "Redirecting anonymous visitor to login");
                    return Redirect::to("/login/").into_response();
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            },

            // --- Store errors ---
            AppError::Database(err) => classify_db_error(err),

            // --- HTTP-specific errors ---
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Template(err) => {
                tracing::error!(error = %err, "Template error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
        };

        (status, Html(error_page(status, &message))).into_response()
    }
}

/// Classify a store error into an HTTP status and message.
///
/// - `NotFound` maps to 404.
/// - Unique violations on `uq_*` constraints map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_db_error(err: &DbError) -> (StatusCode, String) {
    match err {
        DbError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
        DbError::UniqueViolation {
            constraint: Some(constraint),
        } if constraint.starts_with("uq_") => (
            StatusCode::CONFLICT,
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
        }
    }
}

fn error_page(status: StatusCode, message: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    format!(
        "<!doctype html>\n<html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{code} {reason}</title></head>\n\
         <body>\n<h1>{code} {reason}</h1>\n<p>{message}</p>\n\
         <p><a href=\"/\">Back to the catalog</a></p>\n</body>\n</html>\n",
        code = status.as_u16(),
        message = HtmlEscape(message),
    )
}
