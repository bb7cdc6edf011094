//! Superuser-only administration pages for films and categories.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use filmhub_core::error::CoreError;
use filmhub_core::forms::category::{CategoryForm, SLUG_TAKEN};
use filmhub_core::forms::FieldErrors;
use filmhub_core::types::DbId;
use filmhub_db::models::category::CreateCategory;
use filmhub_db::models::film::FilmFilter;
use filmhub_db::store::UQ_CATEGORY_SLUG;
use minijinja::context;
use serde::Deserialize;

use super::redirect;
use crate::error::{AppError, AppResult};
use crate::flash::Flash;
use crate::middleware::auth::{CurrentUser, RequireSuperuser};
use crate::render::{render_page, FormView};
use crate::state::AppState;

const FILMS_URL: &str = "/admin/films/";
const CATEGORIES_URL: &str = "/admin/categories/";

/// GET /admin/
pub async fn index(_admin: RequireSuperuser) -> Redirect {
    Redirect::to(FILMS_URL)
}

#[derive(Debug, Default, Deserialize)]
pub struct FilmListQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub published: String,
}

impl FilmListQuery {
    fn filter(&self) -> FilmFilter {
        let query = self.q.trim();
        FilmFilter {
            query: (!query.is_empty()).then(|| query.to_string()),
            published: match self.published.as_str() {
                "yes" => Some(true),
                "no" => Some(false),
                _ => None,
            },
        }
    }
}

/// GET /admin/films/?q=&published=yes|no
pub async fn films(
    State(state): State<AppState>,
    RequireSuperuser(admin): RequireSuperuser,
    mut flash: Flash,
    Query(query): Query<FilmListQuery>,
) -> AppResult<Response> {
    let films = state.store.list_films(&query.filter()).await?;
    let viewer = CurrentUser(Some(admin));
    let page = render_page(
        &state,
        &viewer,
        &mut flash,
        "admin_films.html",
        context! {
            title => "Films",
            films => films,
            q => query.q,
            published => query.published,
        },
    )
    .await?;
    Ok((flash, page).into_response())
}

#[derive(Debug, Deserialize)]
pub struct PublishForm {
    pub is_published: Option<String>,
}

/// POST /admin/films/{id}/published
pub async fn set_published(
    State(state): State<AppState>,
    RequireSuperuser(admin): RequireSuperuser,
    flash: Flash,
    Path(id): Path<DbId>,
    Form(form): Form<PublishForm>,
) -> AppResult<Response> {
    let is_published = form.is_published.as_deref() == Some("on");
    let film = state
        .store
        .set_film_published(id, is_published)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Film",
            id,
        }))?;
    tracing::info!(film_id = id, is_published, admin_id = admin.id, "Film publication changed");

    let state_word = if film.is_published { "published" } else { "unpublished" };
    let flash = flash.success(format!("The film {} is now {state_word}.", film.title));
    Ok(redirect(flash, FILMS_URL))
}

async fn render_categories(
    state: &AppState,
    viewer: &CurrentUser,
    mut flash: Flash,
    form: &CategoryForm,
    errors: &FieldErrors,
) -> AppResult<Response> {
    let view = FormView::new(CategoryForm::hints(), &form.values(), errors);
    let page = render_page(
        state,
        viewer,
        &mut flash,
        "admin_categories.html",
        context! { title => "Categories", form => view },
    )
    .await?;
    Ok((flash, page).into_response())
}

/// GET /admin/categories/
///
/// The list itself comes from the shared navigation context.
pub async fn categories(
    State(state): State<AppState>,
    RequireSuperuser(admin): RequireSuperuser,
    flash: Flash,
) -> AppResult<Response> {
    let viewer = CurrentUser(Some(admin));
    render_categories(&state, &viewer, flash, &CategoryForm::default(), &FieldErrors::new()).await
}

/// POST /admin/categories/
pub async fn create_category(
    State(state): State<AppState>,
    RequireSuperuser(admin): RequireSuperuser,
    flash: Flash,
    Form(mut form): Form<CategoryForm>,
) -> AppResult<Response> {
    form.normalize();
    let mut errors = match form.clean() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors,
    };
    if !errors.has("slug") && state.store.find_category_by_slug(&form.slug).await?.is_some() {
        errors.add("slug", SLUG_TAKEN);
    }

    if errors.is_empty() {
        let input = CreateCategory {
            name: form.name.clone(),
            slug: form.slug.clone(),
        };
        match state.store.create_category(&input).await {
            Ok(category) => {
                tracing::info!(
                    category_id = category.id,
                    slug = %category.slug,
                    admin_id = admin.id,
                    "Category created"
                );
                let flash = flash.success(format!("The category {} was added.", category.name));
                return Ok(redirect(flash, CATEGORIES_URL));
            }
            Err(e) if e.is_unique_violation(UQ_CATEGORY_SLUG) => errors.add("slug", SLUG_TAKEN),
            Err(e) => return Err(e.into()),
        }
    }

    let viewer = CurrentUser(Some(admin));
    render_categories(&state, &viewer, flash, &form, &errors).await
}

/// POST /admin/categories/{id}/delete
///
/// Films in the category are deleted with it, and so are their images.
pub async fn delete_category(
    State(state): State<AppState>,
    RequireSuperuser(admin): RequireSuperuser,
    flash: Flash,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let images: Vec<String> = state
        .store
        .list_films(&FilmFilter::default())
        .await?
        .into_iter()
        .filter(|film| film.category_id == id)
        .map(|film| film.image)
        .collect();
    if !state.store.delete_category(id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }));
    }
    for image in &images {
        state.media.delete(image).await;
    }
    tracing::info!(
        category_id = id,
        admin_id = admin.id,
        films = images.len(),
        "Category deleted"
    );
    Ok(redirect(flash.success("The category was deleted."), CATEGORIES_URL))
}
