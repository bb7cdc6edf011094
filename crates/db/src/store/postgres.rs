//! PostgreSQL-backed [`Store`].

use async_trait::async_trait;
use filmhub_core::types::DbId;

use super::Store;
use crate::error::DbResult;
use crate::models::category::{Category, CreateCategory};
use crate::models::film::{CreateFilm, Film, FilmFilter, UpdateFilm};
use crate::models::user::{CreateUser, UpdateProfile, User};
use crate::repositories::{CategoryRepo, FilmRepo, UserRepo};
use crate::DbPool;

/// Delegates to the repositories over a shared pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> DbResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }

    async fn list_categories(&self) -> DbResult<Vec<Category>> {
        Ok(CategoryRepo::list(&self.pool).await?)
    }

    async fn find_category_by_slug(&self, slug: &str) -> DbResult<Option<Category>> {
        Ok(CategoryRepo::find_by_slug(&self.pool, slug).await?)
    }

    async fn create_category(&self, input: &CreateCategory) -> DbResult<Category> {
        Ok(CategoryRepo::create(&self.pool, input).await?)
    }

    async fn delete_category(&self, id: DbId) -> DbResult<bool> {
        Ok(CategoryRepo::delete(&self.pool, id).await?)
    }

    async fn list_published_films(&self) -> DbResult<Vec<Film>> {
        Ok(FilmRepo::list_published(&self.pool).await?)
    }

    async fn find_published_film(&self, id: DbId) -> DbResult<Option<Film>> {
        Ok(FilmRepo::find_published(&self.pool, id).await?)
    }

    async fn find_film(&self, id: DbId) -> DbResult<Option<Film>> {
        Ok(FilmRepo::find_by_id(&self.pool, id).await?)
    }

    async fn films_by_category(&self, slug: &str) -> DbResult<Vec<Film>> {
        Ok(FilmRepo::list_by_category_slug(&self.pool, slug).await?)
    }

    async fn search_films(&self, title: &str) -> DbResult<Vec<Film>> {
        Ok(FilmRepo::search_by_title(&self.pool, title).await?)
    }

    async fn films_by_author(&self, author_id: DbId) -> DbResult<Vec<Film>> {
        Ok(FilmRepo::list_by_author(&self.pool, author_id).await?)
    }

    async fn list_films(&self, filter: &FilmFilter) -> DbResult<Vec<Film>> {
        Ok(FilmRepo::list_filtered(&self.pool, filter).await?)
    }

    async fn create_film(&self, input: &CreateFilm) -> DbResult<Film> {
        Ok(FilmRepo::create(&self.pool, input).await?)
    }

    async fn update_film(&self, id: DbId, input: &UpdateFilm) -> DbResult<Option<Film>> {
        Ok(FilmRepo::update(&self.pool, id, input).await?)
    }

    async fn set_film_published(&self, id: DbId, is_published: bool) -> DbResult<Option<Film>> {
        Ok(FilmRepo::set_published(&self.pool, id, is_published).await?)
    }

    async fn delete_film(&self, id: DbId) -> DbResult<Option<Film>> {
        Ok(FilmRepo::delete(&self.pool, id).await?)
    }

    async fn create_user(&self, input: &CreateUser) -> DbResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_user(&self, id: DbId) -> DbResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> DbResult<Option<User>> {
        Ok(UserRepo::find_by_username(&self.pool, username).await?)
    }

    async fn update_profile(&self, id: DbId, input: &UpdateProfile) -> DbResult<Option<User>> {
        Ok(UserRepo::update_profile(&self.pool, id, input).await?)
    }

    async fn record_login(&self, id: DbId) -> DbResult<()> {
        Ok(UserRepo::record_successful_login(&self.pool, id).await?)
    }

    async fn set_superuser(&self, id: DbId, is_superuser: bool) -> DbResult<bool> {
        Ok(UserRepo::set_superuser(&self.pool, id, is_superuser).await?)
    }
}
