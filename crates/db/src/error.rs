use thiserror::Error;

/// Errors the store reports in terms handlers can act on.
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier.
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation (constraints are named `uq_<table>_<column>`).
    #[error("Unique constraint violation: {}", constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },

    /// Foreign key constraint violation (constraints are named `fk_<table>_<column>`).
    #[error("Foreign key constraint violation: {}", constraint.as_deref().unwrap_or("unknown"))]
    ForeignKeyViolation { constraint: Option<String> },

    /// Catch-all for non-recoverable errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    pub fn is_unique_violation(&self, name: &str) -> bool {
        matches!(self, DbError::UniqueViolation { constraint: Some(c) } if c == name)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::UniqueViolation {
                    constraint: db_err.constraint().map(str::to_string),
                }
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DbError::ForeignKeyViolation {
                    constraint: db_err.constraint().map(str::to_string),
                }
            }
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Type alias for store operation results.
pub type DbResult<T> = std::result::Result<T, DbError>;
