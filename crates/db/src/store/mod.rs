//! The storage seam handlers depend on.
//!
//! [`Store`] is object-safe so the web layer can hold an `Arc<dyn Store>`:
//! [`PgStore`] in production, [`MemoryStore`] in tests and local demos.

use async_trait::async_trait;
use filmhub_core::types::DbId;

use crate::error::DbResult;
use crate::models::category::{Category, CreateCategory};
use crate::models::film::{CreateFilm, Film, FilmFilter, UpdateFilm};
use crate::models::user::{CreateUser, UpdateProfile, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Unique constraint on `categories.slug`.
pub const UQ_CATEGORY_SLUG: &str = "uq_categories_slug";
/// Unique constraint on `users.username`.
pub const UQ_USERNAME: &str = "uq_users_username";
/// Foreign key from `films.category_id`.
pub const FK_FILM_CATEGORY: &str = "fk_films_category";
/// Foreign key from `films.author_id`.
pub const FK_FILM_AUTHOR: &str = "fk_films_author";

/// Persistence operations for categories, films and users.
///
/// List operations return rows in id order. Film reads return the joined
/// view with category and author names.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap liveness probe for `/health`.
    async fn health_check(&self) -> DbResult<()>;

    // -- categories --------------------------------------------------------

    async fn list_categories(&self) -> DbResult<Vec<Category>>;

    async fn find_category_by_slug(&self, slug: &str) -> DbResult<Option<Category>>;

    /// # Errors
    /// - `UniqueViolation` on [`UQ_CATEGORY_SLUG`] if the slug is taken
    async fn create_category(&self, input: &CreateCategory) -> DbResult<Category>;

    /// Delete a category and its films. Returns `false` if it did not exist.
    async fn delete_category(&self, id: DbId) -> DbResult<bool>;

    // -- films -------------------------------------------------------------

    async fn list_published_films(&self) -> DbResult<Vec<Film>>;

    async fn find_published_film(&self, id: DbId) -> DbResult<Option<Film>>;

    /// Find a film whatever its published state.
    async fn find_film(&self, id: DbId) -> DbResult<Option<Film>>;

    /// All films of the category with this slug, published or not.
    async fn films_by_category(&self, slug: &str) -> DbResult<Vec<Film>>;

    /// All films whose title contains `title` case-insensitively, published
    /// or not. Wildcard characters in `title` match literally.
    async fn search_films(&self, title: &str) -> DbResult<Vec<Film>>;

    async fn films_by_author(&self, author_id: DbId) -> DbResult<Vec<Film>>;

    async fn list_films(&self, filter: &FilmFilter) -> DbResult<Vec<Film>>;

    /// # Errors
    /// - `ForeignKeyViolation` if the category or author does not exist
    async fn create_film(&self, input: &CreateFilm) -> DbResult<Film>;

    /// Returns `None` if the film does not exist.
    async fn update_film(&self, id: DbId, input: &UpdateFilm) -> DbResult<Option<Film>>;

    async fn set_film_published(&self, id: DbId, is_published: bool) -> DbResult<Option<Film>>;

    /// Delete a film, returning the removed row.
    async fn delete_film(&self, id: DbId) -> DbResult<Option<Film>>;

    // -- users -------------------------------------------------------------

    /// # Errors
    /// - `UniqueViolation` on [`UQ_USERNAME`] if the username is taken
    async fn create_user(&self, input: &CreateUser) -> DbResult<User>;

    async fn find_user(&self, id: DbId) -> DbResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> DbResult<Option<User>>;

    /// # Errors
    /// - `UniqueViolation` on [`UQ_USERNAME`] if another user has the username
    async fn update_profile(&self, id: DbId, input: &UpdateProfile) -> DbResult<Option<User>>;

    async fn record_login(&self, id: DbId) -> DbResult<()>;

    async fn set_superuser(&self, id: DbId, is_superuser: bool) -> DbResult<bool>;
}
