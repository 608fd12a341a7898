//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{entity_type} not found")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Not authorized to {0}")]
    Forbidden(&'static str),
}

impl DomainError {
    pub fn post_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Post",
            key: key.into(),
        }
    }

    pub fn user_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "User",
            key: key.into(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<DomainError> for RepoError {
    fn from(err: DomainError) -> Self {
        RepoError::Corrupt(err.to_string())
    }
}
