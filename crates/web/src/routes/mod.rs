pub mod health;

use axum::routing::{any, get, post};
use axum::Router;

use crate::handlers::{accounts, admin, films, profiles};
use crate::state::AppState;

/// Site routes.
///
/// ```text
/// /                                 home (published films)
/// /film/{id}/                       film detail (published only)
/// /category/{slug}/                 films of a category
/// /search/?title=                   title search
/// /add_film/                        create film (GET form, POST submit)
/// /edit_film/{id}/                  edit film (owner or superuser)
/// /delete_film/{id}/                delete film (any method)
/// /register/ /login/ /exit/         accounts
/// /profile/{id}/                    public profile
/// /edit_profile/{id}/               edit own profile
/// ```
pub fn site_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(films::home))
        .route("/film/{id}/", get(films::film_detail))
        .route("/category/{slug}/", get(films::films_by_category))
        .route("/search/", get(films::search))
        .route("/add_film/", get(films::add_film_form).post(films::add_film))
        .route(
            "/edit_film/{id}/",
            get(films::edit_film_form).post(films::edit_film),
        )
        .route("/delete_film/{id}/", any(films::delete_film))
        .route(
            "/register/",
            get(accounts::register_form).post(accounts::register),
        )
        .route("/login/", get(accounts::login_form).post(accounts::login))
        .route("/exit/", any(accounts::logout))
        .route("/profile/{id}/", get(profiles::profile))
        .route(
            "/edit_profile/{id}/",
            get(profiles::edit_profile_form).post(profiles::edit_profile),
        )
}

/// Superuser administration routes.
///
/// ```text
/// /admin/                              -> /admin/films/
/// /admin/films/?q=&published=          film list
/// /admin/films/{id}/published          POST set published flag
/// /admin/categories/                   GET list + form, POST create
/// /admin/categories/{id}/delete        POST delete
/// ```
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/", get(admin::index))
        .route("/admin/films/", get(admin::films))
        .route("/admin/films/{id}/published", post(admin::set_published))
        .route(
            "/admin/categories/",
            get(admin::categories).post(admin::create_category),
        )
        .route(
            "/admin/categories/{id}/delete",
            post(admin::delete_category),
        )
}
