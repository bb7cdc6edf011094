//! Domain errors shared by every layer above `core`.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A film, category or user addressed by id does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input that can never be accepted, such as an unreadable upload.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The viewer must sign in first.
    #[error("Login required: {0}")]
    Unauthorized(String),

    /// The viewer is signed in but may not do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}
