//! Request handlers, one module per area of the site.

pub mod accounts;
pub mod admin;
pub mod films;
pub mod profiles;

use axum::response::{IntoResponse, Redirect, Response};

use crate::flash::Flash;

/// Redirect carrying the flash state along.
pub(crate) fn redirect(flash: Flash, to: &str) -> Response {
    (flash, Redirect::to(to)).into_response()
}
