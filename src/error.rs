//! Error types for the session store and domain operations.

use thiserror::Error;

/// Result type for Skylark domain and store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by session mutation, validation and local persistence.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error from the embedded store.
    #[error("Database error: {0}")]
    Database(#[from] native_db::db_type::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Required fields missing or a field value rejected before persistence.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A categorical code outside the configured code list for its category.
    #[error("Code '{value}' is not configured for {category}")]
    InvalidCode { category: String, value: String },

    /// Mutation attempted on a session whose status disallows it.
    #[error("Session state conflict: {0}")]
    StateConflict(String),

    /// No session with the given id in the store.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// An import document that cannot become a session.
    #[error("Import rejected: {0}")]
    Import(String),
}
