//! Database-specific error types and conversions.

use kontor_core::error::KontorError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Transaction failed: {0}")]
    Transaction(String),
}

impl From<DbError> for KontorError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => KontorError::NotFound { entity, id },
            other => KontorError::Database(other.to_string()),
        }
    }
}
