//! Session-cookie extractors for Axum handlers.
//!
//! [`CurrentUser`] never rejects: a missing, invalid or expired session, or
//! one naming an unknown or inactive user, yields an anonymous viewer.
//! [`RequireSuperuser`] guards the administration pages.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use filmhub_core::error::CoreError;
use filmhub_core::policy::{authorize, Action, Actor, Denial};
use filmhub_db::models::user::{PublicUser, User};

use crate::auth::session::{verify_session_token, SESSION_COOKIE};
use crate::cookies::read_cookie;
use crate::error::AppError;
use crate::state::AppState;

/// The viewer of the current request, if signed in.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// The identity the authorization policy reasons about.
    pub fn actor(&self) -> Option<Actor> {
        self.0.as_ref().map(|user| Actor {
            id: user.id,
            is_superuser: user.is_superuser,
        })
    }

    pub fn public(&self) -> Option<PublicUser> {
        self.0.as_ref().map(PublicUser::from)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = read_cookie(&parts.headers, SESSION_COOKIE) else {
            return Ok(CurrentUser(None));
        };

        let claims = match verify_session_token(token, &state.config.session) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
                return Ok(CurrentUser(None));
            }
        };

        let user = state
            .store
            .find_user(claims.sub)
            .await?
            .filter(|user| user.is_active);
        Ok(CurrentUser(user))
    }
}

/// Requires a signed-in superuser.
///
/// Anonymous viewers are sent to the login page; other users get 403.
///
/// ```ignore
/// async fn admin_only(RequireSuperuser(user): RequireSuperuser) -> AppResult<Html<String>> {
///     // user.is_superuser holds here
/// }
/// ```
pub struct RequireSuperuser(pub User);

impl FromRequestParts<AppState> for RequireSuperuser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let viewer = CurrentUser::from_request_parts(parts, state).await?;
        match authorize(viewer.actor().as_ref(), Action::Administer) {
            Ok(()) => viewer
                .0
                .map(RequireSuperuser)
                .ok_or_else(|| AppError::Core(CoreError::Unauthorized(
                    Denial::Unauthenticated.message().into(),
                ))),
            Err(Denial::Unauthenticated) => Err(AppError::Core(CoreError::Unauthorized(
                Denial::Unauthenticated.message().into(),
            ))),
            Err(denial) => Err(AppError::Core(CoreError::Forbidden(
                denial.message().into(),
            ))),
        }
    }
}
