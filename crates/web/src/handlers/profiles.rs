//! Handlers for viewing and editing user profiles.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use filmhub_core::error::CoreError;
use filmhub_core::forms::account::{ProfileForm, USERNAME_TAKEN};
use filmhub_core::forms::FieldErrors;
use filmhub_core::policy::{authorize, Action};
use filmhub_core::types::DbId;
use filmhub_db::models::user::{PublicUser, UpdateProfile, User};
use filmhub_db::store::UQ_USERNAME;
use minijinja::context;

use super::redirect;
use crate::error::{AppError, AppResult};
use crate::flash::Flash;
use crate::middleware::auth::CurrentUser;
use crate::render::{render_page, FormView};
use crate::state::AppState;

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

/// GET /profile/{id}/
///
/// Public profile fields plus every film the user wrote.
pub async fn profile(
    State(state): State<AppState>,
    viewer: CurrentUser,
    mut flash: Flash,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    let films = state.store.films_by_author(id).await?;
    let page = render_page(
        &state,
        &viewer,
        &mut flash,
        "profile.html",
        context! {
            title => format!("Profile: {}", user.username),
            profile => PublicUser::from(&user),
            films => films,
        },
    )
    .await?;
    Ok((flash, page).into_response())
}

async fn render_edit_page(
    state: &AppState,
    viewer: &CurrentUser,
    mut flash: Flash,
    user: &User,
    form: &ProfileForm,
    errors: &FieldErrors,
) -> AppResult<Response> {
    let view = FormView::new(ProfileForm::hints(), &form.values(), errors);
    let page = render_page(
        state,
        viewer,
        &mut flash,
        "edit_profile.html",
        context! {
            title => format!("Edit profile: {}", user.username),
            profile_id => user.id,
            form => view,
        },
    )
    .await?;
    Ok((flash, page).into_response())
}

/// The profile being edited, if the viewer is its owner.
///
/// Superusers get no bypass here. A refusal comes back as the inner `Err`.
async fn own_profile(
    state: &AppState,
    viewer: &CurrentUser,
    id: DbId,
) -> AppResult<Result<User, &'static str>> {
    let action = Action::EditProfile { profile_id: id };
    if let Err(denial) = authorize(viewer.actor().as_ref(), action) {
        let viewer_id = viewer.user().map(|u| u.id);
        tracing::info!(profile_id = id, viewer = ?viewer_id, "Profile edit refused");
        return Ok(Err(denial.message()));
    }
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Ok(user))
}

/// GET /edit_profile/{id}/
pub async fn edit_profile_form(
    State(state): State<AppState>,
    viewer: CurrentUser,
    flash: Flash,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let user = match own_profile(&state, &viewer, id).await? {
        Ok(user) => user,
        Err(message) => return Ok(redirect(flash.error(message), "/")),
    };
    let form = ProfileForm {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
    };
    render_edit_page(&state, &viewer, flash, &user, &form, &FieldErrors::new()).await
}

/// POST /edit_profile/{id}/
pub async fn edit_profile(
    State(state): State<AppState>,
    viewer: CurrentUser,
    flash: Flash,
    Path(id): Path<DbId>,
    Form(mut form): Form<ProfileForm>,
) -> AppResult<Response> {
    let user = match own_profile(&state, &viewer, id).await? {
        Ok(user) => user,
        Err(message) => return Ok(redirect(flash.error(message), "/")),
    };

    form.normalize();
    let mut errors = match form.clean() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors,
    };
    if !errors.has("username") {
        let holder = state.store.find_user_by_username(&form.username).await?;
        if holder.is_some_and(|other| other.id != id) {
            errors.add("username", USERNAME_TAKEN);
        }
    }

    if errors.is_empty() {
        let input = UpdateProfile {
            username: form.username.clone(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
        };
        match state.store.update_profile(id, &input).await {
            Ok(Some(_)) => {
                tracing::info!(user_id = id, "Profile updated");
                return Ok(redirect(flash.success("Profile updated!"), &format!("/profile/{id}/")));
            }
            Ok(None) => return Err(user_not_found(id)),
            Err(e) if e.is_unique_violation(UQ_USERNAME) => errors.add("username", USERNAME_TAKEN),
            Err(e) => return Err(e.into()),
        }
    }

    render_edit_page(&state, &viewer, flash, &user, &form, &errors).await
}
