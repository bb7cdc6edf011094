//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod category_repo;
pub mod film_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use film_repo::FilmRepo;
pub use user_repo::UserRepo;
