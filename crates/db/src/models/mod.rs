//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row (or joined view)
//! - A create DTO for inserts
//! - An update DTO where the entity is editable

pub mod category;
pub mod film;
pub mod user;
