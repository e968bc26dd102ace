//! Storage error types.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g., "bug", "user").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A validation constraint was violated.
    #[error("validation error: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// A uniqueness constraint was violated (e.g. duplicate email).
    #[error("conflict: {message}")]
    Conflict {
        /// Which constraint was hit.
        message: String,
    },

    /// Failed to establish or maintain a database connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// A transaction operation failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A schema migration failed.
    #[error("migration {name} failed: {reason}")]
    Migration {
        /// Name of the migration that failed.
        name: String,
        /// Underlying error description.
        reason: String,
    },

    /// A raw SQLite query error.
    #[error("query error: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Convenience alias used throughout the storage crate.
pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    // -- Constructors --------------------------------------------------------

    /// Creates a [`StorageError::NotFound`] for the given entity kind and id.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a [`StorageError::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a [`StorageError::Conflict`] with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    // -- Predicates ----------------------------------------------------------

    /// Returns `true` if this is a [`StorageError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if SQLite rejected the write because of a constraint
    /// (UNIQUE, FOREIGN KEY, CHECK, NOT NULL).
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Conflict { .. } => true,
            Self::Query(rusqlite::Error::SqliteFailure(e, _)) => {
                e.code == rusqlite::ErrorCode::ConstraintViolation
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let err = StorageError::not_found("bug", 42);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "bug not found: 42");
    }

    #[test]
    fn conflict_is_constraint_violation() {
        assert!(StorageError::conflict("email").is_constraint_violation());
        assert!(!StorageError::validation("x").is_constraint_violation());
    }
}
