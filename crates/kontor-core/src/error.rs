//! Error types for the KONTOR system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KontorError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// A grant referenced resources outside the corp's allow-list.
    /// Every offending id is reported so the caller can surface them
    /// together rather than one at a time.
    #[error("Resources not allowed for this corporation: {}", resource_ids.join(", "))]
    DisallowedResources { resource_ids: Vec<String> },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type KontorResult<T> = Result<T, KontorError>;
