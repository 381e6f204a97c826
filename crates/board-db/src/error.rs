use thiserror::Error;

/// Failures surfaced by the credential and message stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("message belongs to another user")]
    Unauthorized,

    #[error("username already taken")]
    DuplicateUser,

    #[error("username must not be empty")]
    InvalidUsername,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    Poisoned,
}
