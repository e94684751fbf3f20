//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A stored value could not be mapped to a domain type
    #[error("invalid stored value: {0}")]
    Decode(String),
}

/// Result alias for repository calls
pub type DbResult<T> = Result<T, DbError>;
