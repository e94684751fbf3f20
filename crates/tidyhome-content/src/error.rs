//! Content error types

use thiserror::Error;

use tidyhome_db::DbError;

/// Errors from the blog and content webhook
#[derive(Debug, Error)]
pub enum ContentError {
    /// Neither signature nor bearer token matched
    #[error("Unauthorized")]
    Unauthorized,

    /// Payload is not a usable article
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Article not found
    #[error("Article not found")]
    NotFound,

    /// Article storage is not configured
    #[error("Article storage not configured")]
    StorageUnavailable,

    /// Bundled dataset failed to parse
    #[error("Static dataset error: {0}")]
    Dataset(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type ContentResult<T> = Result<T, ContentError>;
