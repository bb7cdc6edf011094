//! Handlers for browsing, creating, editing and deleting films.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::{IntoResponse, Response};
use filmhub_core::error::CoreError;
use filmhub_core::forms::film::FilmForm;
use filmhub_core::forms::FieldErrors;
use filmhub_core::media::{stored_image_path, ImageInfo, UploadedImage};
use filmhub_core::policy::{authorize, Action, Denial};
use filmhub_core::types::DbId;
use filmhub_db::models::category::Category;
use filmhub_db::models::film::{CreateFilm, Film, UpdateFilm};
use minijinja::context;
use serde::Deserialize;

use super::redirect;
use crate::error::{AppError, AppResult};
use crate::flash::Flash;
use crate::middleware::auth::CurrentUser;
use crate::render::{render_page, Choice, FormView};
use crate::state::AppState;

fn film_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Film", id })
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /
///
/// Published films only, in insertion order.
pub async fn home(
    State(state): State<AppState>,
    viewer: CurrentUser,
    mut flash: Flash,
) -> AppResult<Response> {
    let films = state.store.list_published_films().await?;
    let page = render_page(
        &state,
        &viewer,
        &mut flash,
        "index.html",
        context! { title => "Home", films => films },
    )
    .await?;
    Ok((flash, page).into_response())
}

/// GET /film/{id}/
///
/// Unpublished films are not found here, even for their author.
pub async fn film_detail(
    State(state): State<AppState>,
    viewer: CurrentUser,
    mut flash: Flash,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let film = state
        .store
        .find_published_film(id)
        .await?
        .ok_or_else(|| film_not_found(id))?;
    let page = render_page(
        &state,
        &viewer,
        &mut flash,
        "film_detail.html",
        context! { title => film.title.clone(), film => film },
    )
    .await?;
    Ok((flash, page).into_response())
}

/// GET /category/{slug}/
///
/// Unfiltered view: lists every film of the category, published or not.
pub async fn films_by_category(
    State(state): State<AppState>,
    viewer: CurrentUser,
    mut flash: Flash,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let category = state
        .store
        .find_category_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category '{slug}'")))?;
    let films = state.store.films_by_category(&slug).await?;
    let page = render_page(
        &state,
        &viewer,
        &mut flash,
        "index.html",
        context! { title => category.name, films => films },
    )
    .await?;
    Ok((flash, page).into_response())
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub title: Option<String>,
}

/// GET /search/?title=<q>
///
/// Unfiltered view: matches titles case-insensitively regardless of the
/// published flag. A missing `title` matches every film.
pub async fn search(
    State(state): State<AppState>,
    viewer: CurrentUser,
    mut flash: Flash,
    Query(query): Query<SearchQuery>,
) -> AppResult<Response> {
    let q = query.title.unwrap_or_default();
    let films = state.store.search_films(&q).await?;
    let title = format!("Results for '{q}': {} films found", films.len());
    let page = render_page(
        &state,
        &viewer,
        &mut flash,
        "index.html",
        context! { title => title, query => q, films => films },
    )
    .await?;
    Ok((flash, page).into_response())
}

// ---------------------------------------------------------------------------
// Create / edit
// ---------------------------------------------------------------------------

/// Which page the film form is on.
enum FormMode<'a> {
    Create,
    Edit(&'a Film),
}

async fn render_film_form(
    state: &AppState,
    viewer: &CurrentUser,
    flash: &mut Flash,
    mode: FormMode<'_>,
    form: &FilmForm,
    categories: &[Category],
    errors: &FieldErrors,
) -> AppResult<Response> {
    let editing = matches!(mode, FormMode::Edit(_));
    let view = FormView::new(FilmForm::hints(editing), &form.values(), errors)
        .with_choices("category", categories.iter().map(Choice::from).collect());
    let context = match mode {
        FormMode::Create => context! {
            title => "Create film",
            button_text => "Create",
            button_color => "primary",
            form => view,
        },
        FormMode::Edit(film) => context! {
            title => format!("Edit: {}", film.title),
            button_text => "Save",
            button_color => "success",
            form => view,
            film => film,
        },
    };
    let page = render_page(state, viewer, flash, "edit_film.html", context).await?;
    Ok(page.into_response())
}

/// Read the multipart film form. Any `author` field is ignored.
async fn read_film_form(mut multipart: Multipart) -> AppResult<FilmForm> {
    let mut form = FilmForm {
        is_published: false,
        ..FilmForm::default()
    };
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?;
                if !bytes.is_empty() {
                    form.image = Some(UploadedImage {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "title" | "description" | "category" | "is_published" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed form data: {e}")))?;
                match name.as_str() {
                    "title" => form.title = value,
                    "description" => form.description = value,
                    "category" => form.category_id = value.trim().parse().ok(),
                    _ => form.is_published = matches!(value.as_str(), "on" | "true" | "1"),
                }
            }
            _ => {}
        }
    }
    form.normalize();
    Ok(form)
}

/// Validate and, for a new upload, write the image to the media root.
///
/// Returns the stored relative path of the new image, if one was uploaded.
async fn clean_and_store_image(
    state: &AppState,
    form: &FilmForm,
    categories: &[Category],
    has_existing_image: bool,
) -> AppResult<Result<Option<String>, FieldErrors>> {
    let category_ids: Vec<DbId> = categories.iter().map(|c| c.id).collect();
    let info: Option<ImageInfo> =
        match form.clean(&category_ids, has_existing_image, state.config.max_upload_bytes) {
            Ok(info) => info,
            Err(errors) => return Ok(Err(errors)),
        };

    let (Some(info), Some(upload)) = (info, form.image.as_ref()) else {
        return Ok(Ok(None));
    };
    let path = stored_image_path(&info);
    state
        .media
        .save(&path, &upload.bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store image: {e}")))?;
    tracing::debug!(
        path = %path,
        original = %upload.filename,
        width = info.width,
        height = info.height,
        "Stored film image"
    );
    Ok(Ok(Some(path)))
}

/// Anonymous viewers are sent to the login page.
fn require_author(viewer: &CurrentUser) -> AppResult<DbId> {
    authorize(viewer.actor().as_ref(), Action::CreateFilm).map_err(|denial| {
        AppError::Core(CoreError::Unauthorized(denial.message().into()))
    })?;
    viewer
        .user()
        .map(|user| user.id)
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                Denial::Unauthenticated.message().into(),
            ))
        })
}

/// GET /add_film/
pub async fn add_film_form(
    State(state): State<AppState>,
    viewer: CurrentUser,
    mut flash: Flash,
) -> AppResult<Response> {
    require_author(&viewer)?;
    let categories = state.store.list_categories().await?;
    let page = render_film_form(
        &state,
        &viewer,
        &mut flash,
        FormMode::Create,
        &FilmForm::default(),
        &categories,
        &FieldErrors::new(),
    )
    .await?;
    Ok((flash, page).into_response())
}

/// POST /add_film/
///
/// The author is always the signed-in viewer.
pub async fn add_film(
    State(state): State<AppState>,
    viewer: CurrentUser,
    mut flash: Flash,
    multipart: Multipart,
) -> AppResult<Response> {
    let author_id = require_author(&viewer)?;
    let form = read_film_form(multipart).await?;
    let categories = state.store.list_categories().await?;

    let image = match clean_and_store_image(&state, &form, &categories, false).await? {
        Ok(Some(image)) => image,
        Ok(None) => return Err(AppError::InternalError("Validated film has no image".into())),
        Err(errors) => {
            let page = render_film_form(
                &state,
                &viewer,
                &mut flash,
                FormMode::Create,
                &form,
                &categories,
                &errors,
            )
            .await?;
            return Ok((flash, page).into_response());
        }
    };

    let input = CreateFilm {
        title: form.title,
        description: form.description,
        image: image.clone(),
        is_published: form.is_published,
        category_id: form.category_id.unwrap_or(1),
        author_id,
    };
    let film = state
        .media
        .discard_on_error(&image, state.store.create_film(&input))
        .await?;
    tracing::info!(film_id = film.id, author_id, "Film created");
    Ok(redirect(flash, &format!("/film/{}/", film.id)))
}

/// Load a film for editing and apply the edit policy.
///
/// A missing film is an error; a refusal comes back as the inner `Err`.
async fn editable_film(
    state: &AppState,
    viewer: &CurrentUser,
    id: DbId,
) -> AppResult<Result<Film, Denial>> {
    let film = state
        .store
        .find_film(id)
        .await?
        .ok_or_else(|| film_not_found(id))?;
    let action = Action::EditFilm {
        author_id: film.author_id,
    };
    Ok(authorize(viewer.actor().as_ref(), action).map(|()| film))
}

/// GET /edit_film/{id}/
pub async fn edit_film_form(
    State(state): State<AppState>,
    viewer: CurrentUser,
    mut flash: Flash,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let film = match editable_film(&state, &viewer, id).await? {
        Ok(film) => film,
        Err(denial) => return Ok(redirect(flash.error(denial.message()), "/")),
    };
    let form = FilmForm {
        title: film.title.clone(),
        description: film.description.clone(),
        category_id: Some(film.category_id),
        is_published: film.is_published,
        image: None,
    };
    let categories = state.store.list_categories().await?;
    let page = render_film_form(
        &state,
        &viewer,
        &mut flash,
        FormMode::Edit(&film),
        &form,
        &categories,
        &FieldErrors::new(),
    )
    .await?;
    Ok((flash, page).into_response())
}

/// POST /edit_film/{id}/
///
/// Owner or superuser only. The author never changes; an empty upload keeps
/// the current image.
pub async fn edit_film(
    State(state): State<AppState>,
    viewer: CurrentUser,
    mut flash: Flash,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Response> {
    let film = match editable_film(&state, &viewer, id).await? {
        Ok(film) => film,
        Err(denial) => {
            let viewer_id = viewer.user().map(|u| u.id);
            tracing::info!(film_id = id, viewer = ?viewer_id, "Film edit refused");
            return Ok(redirect(flash.error(denial.message()), "/"));
        }
    };
    let form = read_film_form(multipart).await?;
    let categories = state.store.list_categories().await?;

    let image = match clean_and_store_image(&state, &form, &categories, true).await? {
        Ok(image) => image,
        Err(errors) => {
            let page = render_film_form(
                &state,
                &viewer,
                &mut flash,
                FormMode::Edit(&film),
                &form,
                &categories,
                &errors,
            )
            .await?;
            return Ok((flash, page).into_response());
        }
    };

    let input = UpdateFilm {
        title: form.title,
        description: form.description,
        image: image.clone(),
        is_published: form.is_published,
        category_id: form.category_id.unwrap_or(film.category_id),
    };
    let commit = async {
        let updated = state.store.update_film(id, &input).await?;
        Ok::<_, AppError>(updated.ok_or_else(|| film_not_found(id))?)
    };
    let updated = match &image {
        Some(path) => state.media.discard_on_error(path, commit).await?,
        None => commit.await?,
    };
    tracing::info!(film_id = id, "Film updated");

    if updated.image != film.image {
        state.media.delete(&film.image).await;
    }
    Ok(redirect(flash, &format!("/film/{id}/")))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Any method on /delete_film/{id}/
///
/// No confirmation step and no ownership check: deletion is unrestricted.
pub async fn delete_film(
    State(state): State<AppState>,
    viewer: CurrentUser,
    flash: Flash,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    authorize(viewer.actor().as_ref(), Action::DeleteFilm)
        .map_err(|denial| AppError::Core(CoreError::Forbidden(denial.message().into())))?;

    let film = state
        .store
        .delete_film(id)
        .await?
        .ok_or_else(|| film_not_found(id))?;
    tracing::info!(film_id = id, viewer = ?viewer.user().map(|u| u.id), "Film deleted");

    state.media.delete(&film.image).await;
    let flash = flash.success(format!("You have successfully deleted the film {}!", film.title));
    Ok(redirect(flash, "/"))
}
