//! Repository for the `films` table.
//!
//! Every read returns the joined [`Film`] view. Mutations run inside a CTE so
//! the joined row comes back from the same statement.

use filmhub_core::search::escape_like;
use filmhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::film::{CreateFilm, Film, FilmFilter, UpdateFilm};

/// Joined column list; `f` is the films row (or CTE) alias.
const COLUMNS: &str = "f.id, f.title, f.description, f.image, f.is_published, \
                       f.category_id, c.name AS category_name, c.slug AS category_slug, \
                       f.author_id, u.username AS author_username, f.created_at, f.updated_at";

const JOINS: &str = "JOIN categories c ON c.id = f.category_id \
                     JOIN users u ON u.id = f.author_id";

/// Provides CRUD operations for films.
pub struct FilmRepo;

impl FilmRepo {
    /// Insert a new film, returning the joined row.
    pub async fn create(pool: &PgPool, input: &CreateFilm) -> Result<Film, sqlx::Error> {
        let query = format!(
            "WITH f AS (
                INSERT INTO films (title, description, image, is_published, category_id, author_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
             )
             SELECT {COLUMNS} FROM f {JOINS}"
        );
        sqlx::query_as::<_, Film>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.image)
            .bind(input.is_published)
            .bind(input.category_id)
            .bind(input.author_id)
            .fetch_one(pool)
            .await
    }

    /// Find a film by ID regardless of its published state.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Film>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM films f {JOINS} WHERE f.id = $1");
        sqlx::query_as::<_, Film>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a film by ID only if it is published.
    pub async fn find_published(pool: &PgPool, id: DbId) -> Result<Option<Film>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM films f {JOINS} WHERE f.id = $1 AND f.is_published");
        sqlx::query_as::<_, Film>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List published films in id order.
    pub async fn list_published(pool: &PgPool) -> Result<Vec<Film>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM films f {JOINS} WHERE f.is_published ORDER BY f.id");
        sqlx::query_as::<_, Film>(&query).fetch_all(pool).await
    }

    /// List every film of a category, published or not.
    pub async fn list_by_category_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Vec<Film>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM films f {JOINS} WHERE c.slug = $1 ORDER BY f.id");
        sqlx::query_as::<_, Film>(&query)
            .bind(slug)
            .fetch_all(pool)
            .await
    }

    /// Films whose title contains `title`, case-insensitively, published or not.
    pub async fn search_by_title(pool: &PgPool, title: &str) -> Result<Vec<Film>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM films f {JOINS}
             WHERE f.title ILIKE '%' || $1 || '%' ESCAPE '\\'
             ORDER BY f.id"
        );
        sqlx::query_as::<_, Film>(&query)
            .bind(escape_like(title))
            .fetch_all(pool)
            .await
    }

    /// Every film written by a user, published or not.
    pub async fn list_by_author(pool: &PgPool, author_id: DbId) -> Result<Vec<Film>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM films f {JOINS} WHERE f.author_id = $1 ORDER BY f.id");
        sqlx::query_as::<_, Film>(&query)
            .bind(author_id)
            .fetch_all(pool)
            .await
    }

    /// Administration list: optional text match on title or description and
    /// optional published filter.
    pub async fn list_filtered(
        pool: &PgPool,
        filter: &FilmFilter,
    ) -> Result<Vec<Film>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM films f {JOINS}
             WHERE ($1::text IS NULL
                    OR f.title ILIKE '%' || $1 || '%' ESCAPE '\\'
                    OR f.description ILIKE '%' || $1 || '%' ESCAPE '\\')
               AND ($2::boolean IS NULL OR f.is_published = $2)
             ORDER BY f.id"
        );
        sqlx::query_as::<_, Film>(&query)
            .bind(filter.query.as_deref().map(escape_like))
            .bind(filter.published)
            .fetch_all(pool)
            .await
    }

    /// Replace the editable fields. A `None` image keeps the current one.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFilm,
    ) -> Result<Option<Film>, sqlx::Error> {
        let query = format!(
            "WITH f AS (
                UPDATE films SET
                    title = $2,
                    description = $3,
                    image = COALESCE($4, image),
                    is_published = $5,
                    category_id = $6
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM f {JOINS}"
        );
        sqlx::query_as::<_, Film>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.image)
            .bind(input.is_published)
            .bind(input.category_id)
            .fetch_optional(pool)
            .await
    }

    /// Set the published flag. Returns `None` if no row with the given `id` exists.
    pub async fn set_published(
        pool: &PgPool,
        id: DbId,
        is_published: bool,
    ) -> Result<Option<Film>, sqlx::Error> {
        let query = format!(
            "WITH f AS (
                UPDATE films SET is_published = $2 WHERE id = $1 RETURNING *
             )
             SELECT {COLUMNS} FROM f {JOINS}"
        );
        sqlx::query_as::<_, Film>(&query)
            .bind(id)
            .bind(is_published)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a film, returning the removed row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Film>, sqlx::Error> {
        let query = format!(
            "WITH f AS (
                DELETE FROM films WHERE id = $1 RETURNING *
             )
             SELECT {COLUMNS} FROM f {JOINS}"
        );
        sqlx::query_as::<_, Film>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
