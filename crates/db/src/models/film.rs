//! Film entity model and DTOs.

use filmhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A film joined with its category and author.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Film {
    pub id: DbId,
    pub title: String,
    pub description: String,
    /// Path relative to the media root.
    pub image: String,
    pub is_published: bool,
    pub category_id: DbId,
    pub category_name: String,
    pub category_slug: String,
    pub author_id: DbId,
    pub author_username: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a film. `author_id` always comes from the session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFilm {
    pub title: String,
    pub description: String,
    pub image: String,
    pub is_published: bool,
    pub category_id: DbId,
    pub author_id: DbId,
}

/// DTO for editing a film. The author never changes.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFilm {
    pub title: String,
    pub description: String,
    /// `None` keeps the current image.
    pub image: Option<String>,
    pub is_published: bool,
    pub category_id: DbId,
}

/// Filters for the administration film list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilmFilter {
    /// Case-insensitive match against title or description.
    pub query: Option<String>,
    pub published: Option<bool>,
}
