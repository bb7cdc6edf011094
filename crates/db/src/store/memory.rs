//! In-memory [`Store`].
//!
//! Keeps every table in a `BTreeMap` behind one lock, so ids come back in
//! insertion order like the PostgreSQL queries. Enforces the same unique
//! and foreign-key constraints (with the same constraint names), cascades
//! category deletes to films and keeps `updated_at` monotonic. Data is lost
//! when the store is dropped.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use filmhub_core::search::contains_ignore_case;
use filmhub_core::types::{DbId, Timestamp};
use parking_lot::RwLock;

use super::{Store, FK_FILM_AUTHOR, FK_FILM_CATEGORY, UQ_CATEGORY_SLUG, UQ_USERNAME};
use crate::error::{DbError, DbResult};
use crate::models::category::{Category, CreateCategory};
use crate::models::film::{CreateFilm, Film, FilmFilter, UpdateFilm};
use crate::models::user::{CreateUser, UpdateProfile, User};

/// A `films` row before joining.
#[derive(Debug, Clone)]
struct FilmRow {
    id: DbId,
    title: String,
    description: String,
    image: String,
    is_published: bool,
    category_id: DbId,
    author_id: DbId,
    created_at: Timestamp,
    updated_at: Timestamp,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<DbId, User>,
    categories: BTreeMap<DbId, Category>,
    films: BTreeMap<DbId, FilmRow>,
    last_user_id: DbId,
    last_category_id: DbId,
    last_film_id: DbId,
}

impl Tables {
    fn join(&self, row: &FilmRow) -> Option<Film> {
        let category = self.categories.get(&row.category_id)?;
        let author = self.users.get(&row.author_id)?;
        Some(Film {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            image: row.image.clone(),
            is_published: row.is_published,
            category_id: row.category_id,
            category_name: category.name.clone(),
            category_slug: category.slug.clone(),
            author_id: row.author_id,
            author_username: author.username.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn films_where(&self, predicate: impl Fn(&Film) -> bool) -> Vec<Film> {
        self.films
            .values()
            .filter_map(|row| self.join(row))
            .filter(|film| predicate(film))
            .collect()
    }

    fn check_film_refs(&self, category_id: DbId, author_id: DbId) -> DbResult<()> {
        if !self.categories.contains_key(&category_id) {
            return Err(foreign_key(FK_FILM_CATEGORY));
        }
        if !self.users.contains_key(&author_id) {
            return Err(foreign_key(FK_FILM_AUTHOR));
        }
        Ok(())
    }

    fn username_taken(&self, username: &str, except: Option<DbId>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

fn unique(constraint: &str) -> DbError {
    DbError::UniqueViolation {
        constraint: Some(constraint.to_string()),
    }
}

fn foreign_key(constraint: &str) -> DbError {
    DbError::ForeignKeyViolation {
        constraint: Some(constraint.to_string()),
    }
}

/// `updated_at` for a modified row: now, but never earlier than before.
fn touch(previous: Timestamp) -> Timestamp {
    Utc::now().max(previous)
}

/// In-memory implementation of the [`Store`] trait.
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create a store holding the default "Uncategorized" category (id 1),
    /// mirroring the seed migration.
    pub fn new() -> Self {
        let now = Utc::now();
        let mut tables = Tables::default();
        tables.last_category_id = 1;
        tables.categories.insert(
            1,
            Category {
                id: 1,
                name: "Uncategorized".to_string(),
                slug: "uncategorized".to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Set a user's active flag. No page deactivates accounts, so this is
    /// only reachable through the in-memory store.
    pub fn set_active(&self, id: DbId, is_active: bool) -> bool {
        let mut tables = self.tables.write();
        let Some(user) = tables.users.get_mut(&id) else {
            return false;
        };
        user.is_active = is_active;
        user.updated_at = touch(user.updated_at);
        true
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> DbResult<()> {
        Ok(())
    }

    async fn list_categories(&self) -> DbResult<Vec<Category>> {
        Ok(self.tables.read().categories.values().cloned().collect())
    }

    async fn find_category_by_slug(&self, slug: &str) -> DbResult<Option<Category>> {
        let tables = self.tables.read();
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn create_category(&self, input: &CreateCategory) -> DbResult<Category> {
        let mut tables = self.tables.write();
        if tables.categories.values().any(|c| c.slug == input.slug) {
            return Err(unique(UQ_CATEGORY_SLUG));
        }
        tables.last_category_id += 1;
        let now = Utc::now();
        let category = Category {
            id: tables.last_category_id,
            name: input.name.clone(),
            slug: input.slug.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: DbId) -> DbResult<bool> {
        let mut tables = self.tables.write();
        if tables.categories.remove(&id).is_none() {
            return Ok(false);
        }
        tables.films.retain(|_, film| film.category_id != id);
        Ok(true)
    }

    async fn list_published_films(&self) -> DbResult<Vec<Film>> {
        Ok(self.tables.read().films_where(|f| f.is_published))
    }

    async fn find_published_film(&self, id: DbId) -> DbResult<Option<Film>> {
        Ok(self
            .find_film(id)
            .await?
            .filter(|film| film.is_published))
    }

    async fn find_film(&self, id: DbId) -> DbResult<Option<Film>> {
        let tables = self.tables.read();
        Ok(tables.films.get(&id).and_then(|row| tables.join(row)))
    }

    async fn films_by_category(&self, slug: &str) -> DbResult<Vec<Film>> {
        Ok(self.tables.read().films_where(|f| f.category_slug == slug))
    }

    async fn search_films(&self, title: &str) -> DbResult<Vec<Film>> {
        Ok(self
            .tables
            .read()
            .films_where(|f| contains_ignore_case(&f.title, title)))
    }

    async fn films_by_author(&self, author_id: DbId) -> DbResult<Vec<Film>> {
        Ok(self.tables.read().films_where(|f| f.author_id == author_id))
    }

    async fn list_films(&self, filter: &FilmFilter) -> DbResult<Vec<Film>> {
        Ok(self.tables.read().films_where(|f| {
            let text_ok = filter.query.as_deref().map_or(true, |q| {
                contains_ignore_case(&f.title, q) || contains_ignore_case(&f.description, q)
            });
            let published_ok = filter.published.map_or(true, |p| f.is_published == p);
            text_ok && published_ok
        }))
    }

    async fn create_film(&self, input: &CreateFilm) -> DbResult<Film> {
        let mut tables = self.tables.write();
        tables.check_film_refs(input.category_id, input.author_id)?;
        tables.last_film_id += 1;
        let now = Utc::now();
        let row = FilmRow {
            id: tables.last_film_id,
            title: input.title.clone(),
            description: input.description.clone(),
            image: input.image.clone(),
            is_published: input.is_published,
            category_id: input.category_id,
            author_id: input.author_id,
            created_at: now,
            updated_at: now,
        };
        let film = tables
            .join(&row)
            .ok_or_else(|| foreign_key(FK_FILM_CATEGORY))?;
        tables.films.insert(row.id, row);
        Ok(film)
    }

    async fn update_film(&self, id: DbId, input: &UpdateFilm) -> DbResult<Option<Film>> {
        let mut tables = self.tables.write();
        let Some(author_id) = tables.films.get(&id).map(|row| row.author_id) else {
            return Ok(None);
        };
        tables.check_film_refs(input.category_id, author_id)?;
        let Some(row) = tables.films.get_mut(&id) else {
            return Ok(None);
        };
        row.title = input.title.clone();
        row.description = input.description.clone();
        if let Some(image) = &input.image {
            row.image = image.clone();
        }
        row.is_published = input.is_published;
        row.category_id = input.category_id;
        row.updated_at = touch(row.updated_at);
        let row = row.clone();
        Ok(tables.join(&row))
    }

    async fn set_film_published(&self, id: DbId, is_published: bool) -> DbResult<Option<Film>> {
        let mut tables = self.tables.write();
        let Some(row) = tables.films.get_mut(&id) else {
            return Ok(None);
        };
        row.is_published = is_published;
        row.updated_at = touch(row.updated_at);
        let row = row.clone();
        Ok(tables.join(&row))
    }

    async fn delete_film(&self, id: DbId) -> DbResult<Option<Film>> {
        let mut tables = self.tables.write();
        let film = tables.films.get(&id).and_then(|row| tables.join(row));
        tables.films.remove(&id);
        Ok(film)
    }

    async fn create_user(&self, input: &CreateUser) -> DbResult<User> {
        let mut tables = self.tables.write();
        if tables.username_taken(&input.username, None) {
            return Err(unique(UQ_USERNAME));
        }
        tables.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.last_user_id,
            username: input.username.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            is_superuser: input.is_superuser,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: DbId) -> DbResult<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let tables = self.tables.read();
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_profile(&self, id: DbId, input: &UpdateProfile) -> DbResult<Option<User>> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if tables.username_taken(&input.username, Some(id)) {
            return Err(unique(UQ_USERNAME));
        }
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        user.username = input.username.clone();
        user.first_name = input.first_name.clone();
        user.last_name = input.last_name.clone();
        user.email = input.email.clone();
        user.updated_at = touch(user.updated_at);
        Ok(Some(user.clone()))
    }

    async fn record_login(&self, id: DbId) -> DbResult<()> {
        if let Some(user) = self.tables.write().users.get_mut(&id) {
            user.last_login_at = Some(Utc::now());
            user.updated_at = touch(user.updated_at);
        }
        Ok(())
    }

    async fn set_superuser(&self, id: DbId, is_superuser: bool) -> DbResult<bool> {
        let mut tables = self.tables.write();
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(false);
        };
        user.is_superuser = is_superuser;
        user.updated_at = touch(user.updated_at);
        Ok(true)
    }
}
