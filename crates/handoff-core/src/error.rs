//! Domain errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Pending session not found")]
    PendingSessionNotFound,

    #[error("Pending session already consumed")]
    AlreadyConsumed,

    #[error("Pending session expired")]
    PendingSessionExpired,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
