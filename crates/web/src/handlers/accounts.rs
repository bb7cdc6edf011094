//! Handlers for registration, login and logout.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Form;
use filmhub_core::forms::account::{
    LoginForm, RegisterForm, INACTIVE_LOGIN, INVALID_LOGIN, USERNAME_TAKEN,
};
use filmhub_core::forms::FieldErrors;
use filmhub_db::models::user::{CreateUser, User};
use filmhub_db::store::UQ_USERNAME;
use minijinja::context;
use serde::Serialize;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::{clear_session_cookie, create_session_token, session_cookie};
use crate::error::{AppError, AppResult};
use crate::flash::Flash;
use crate::middleware::auth::CurrentUser;
use crate::render::{render_page, FormView};
use crate::state::AppState;

/// Link under the form to the other account page.
#[derive(Serialize)]
struct Alternate {
    url: &'static str,
    text: &'static str,
}

async fn render_auth_page(
    state: &AppState,
    viewer: &CurrentUser,
    mut flash: Flash,
    title: &str,
    button_text: &str,
    form: FormView,
    alternate: Alternate,
) -> AppResult<Response> {
    let page = render_page(
        state,
        viewer,
        &mut flash,
        "user_auth.html",
        context! {
            title => title,
            button_text => button_text,
            form => form,
            alternate => alternate,
        },
    )
    .await?;
    Ok((flash, page).into_response())
}

const TO_LOGIN: Alternate = Alternate {
    url: "/login/",
    text: "Already registered? Log in",
};

const TO_REGISTER: Alternate = Alternate {
    url: "/register/",
    text: "No account yet? Register",
};

/// Start a session for `user`: record the login and set the cookie.
async fn sign_in(
    state: &AppState,
    user: &User,
    flash: Flash,
    message: &str,
) -> AppResult<Response> {
    state.store.record_login(user.id).await?;
    let token = create_session_token(user.id, &user.username, &state.config.session)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let cookie = session_cookie(&token, &state.config.session);
    tracing::info!(user_id = user.id, username = %user.username, "User signed in");
    Ok((
        flash.success(message),
        AppendHeaders([(SET_COOKIE, cookie)]),
        Redirect::to("/"),
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

/// GET /register/
pub async fn register_form(
    State(state): State<AppState>,
    viewer: CurrentUser,
    flash: Flash,
) -> AppResult<Response> {
    let form = RegisterForm::default();
    let view = FormView::new(RegisterForm::hints(), &form.values(), &FieldErrors::new());
    render_auth_page(&state, &viewer, flash, "Register", "Register", view, TO_LOGIN).await
}

/// POST /register/
///
/// Creates the account and signs it in straight away.
pub async fn register(
    State(state): State<AppState>,
    viewer: CurrentUser,
    flash: Flash,
    Form(mut form): Form<RegisterForm>,
) -> AppResult<Response> {
    form.normalize();
    let mut errors = match form.clean(state.config.password_min_length) {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors,
    };
    if !errors.has("username")
        && state
            .store
            .find_user_by_username(&form.username)
            .await?
            .is_some()
    {
        errors.add("username", USERNAME_TAKEN);
    }

    if errors.is_empty() {
        let password_hash = hash_password(&form.password1)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
        let created = state
            .store
            .create_user(&CreateUser {
                username: form.username.clone(),
                first_name: form.first_name.clone(),
                last_name: form.last_name.clone(),
                email: form.email.clone(),
                password_hash,
                is_superuser: false,
            })
            .await;
        match created {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "User registered");
                return sign_in(&state, &user, flash, "You have successfully registered!").await;
            }
            // Lost a race with another registration.
            Err(e) if e.is_unique_violation(UQ_USERNAME) => errors.add("username", USERNAME_TAKEN),
            Err(e) => return Err(e.into()),
        }
    }

    let view = FormView::new(RegisterForm::hints(), &form.values(), &errors);
    render_auth_page(&state, &viewer, flash, "Register", "Register", view, TO_LOGIN).await
}

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

/// GET /login/
pub async fn login_form(
    State(state): State<AppState>,
    viewer: CurrentUser,
    flash: Flash,
) -> AppResult<Response> {
    let form = LoginForm::default();
    let view = FormView::new(LoginForm::hints(), &form.values(), &FieldErrors::new());
    render_auth_page(&state, &viewer, flash, "Log in", "Log in", view, TO_REGISTER).await
}

/// POST /login/
pub async fn login(
    State(state): State<AppState>,
    viewer: CurrentUser,
    flash: Flash,
    Form(mut form): Form<LoginForm>,
) -> AppResult<Response> {
    form.normalize();
    let errors = match form.clean() {
        Ok(()) => match authenticate(&state, &form).await? {
            Ok(user) => {
                return sign_in(&state, &user, flash, "You have successfully logged in!").await
            }
            Err(message) => {
                let mut errors = FieldErrors::new();
                errors.add_non_field(message);
                errors
            }
        },
        Err(errors) => errors,
    };

    let view = FormView::new(LoginForm::hints(), &form.values(), &errors);
    render_auth_page(&state, &viewer, flash, "Log in", "Log in", view, TO_REGISTER).await
}

/// Check credentials. The inner `Err` is the message to show.
async fn authenticate(state: &AppState, form: &LoginForm) -> AppResult<Result<User, &'static str>> {
    let Some(user) = state.store.find_user_by_username(&form.username).await? else {
        tracing::debug!(username = %form.username, "Login for unknown username");
        return Ok(Err(INVALID_LOGIN));
    };

    let password_valid = verify_password(&form.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Login with wrong password");
        return Ok(Err(INVALID_LOGIN));
    }
    if !user.is_active {
        return Ok(Err(INACTIVE_LOGIN));
    }
    Ok(Ok(user))
}

/// Any method on /exit/
pub async fn logout(State(state): State<AppState>, flash: Flash) -> Response {
    (
        flash.success("You have successfully logged out!"),
        AppendHeaders([(SET_COOKIE, clear_session_cookie(&state.config.session))]),
        Redirect::to("/"),
    )
        .into_response()
}
