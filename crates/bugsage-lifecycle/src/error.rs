//! Error types for lifecycle operations.

use bugsage_core::credential::CredentialError;
use bugsage_core::validation::ValidationError;
use bugsage_storage::StorageError;

/// Coarse classification used by front ends to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something unacceptable.
    BadInput,
    NotFound,
    /// Persistence failed; details are logged, not shown.
    Internal,
}

/// Errors returned by [`LifecycleEngine`](crate::LifecycleEngine) operations.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Input failed a validation rule. The message is user-facing.
    #[error("{0}")]
    Validation(String),

    /// The addressed entity does not exist.
    #[error("{entity} not found")]
    NotFound { entity: String, id: String },

    /// A project or assignee reference does not resolve.
    #[error("Invalid {field} selected")]
    Reference { field: &'static str },

    /// Underlying store failure.
    #[error("internal storage error")]
    Store(#[source] StorageError),

    /// Reading or writing an attachment file failed.
    #[error("attachment storage failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Shown for uniqueness violations no operation translated itself.
pub const CONFLICT_MESSAGE: &str = "Record already exists";

/// Convenience alias used throughout the lifecycle crate.
pub type Result<T> = std::result::Result<T, LifecycleError>;

impl LifecycleError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Reference { .. } => ErrorKind::BadInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Store(_) | Self::Io(_) | Self::Credential(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ValidationError> for LifecycleError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<StorageError> for LifecycleError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { entity, id } => Self::NotFound {
                entity: display_entity(&entity),
                id,
            },
            StorageError::Validation { message } => Self::Validation(message),
            StorageError::Conflict { message } => {
                tracing::debug!(%message, "uniqueness conflict");
                Self::Validation(CONFLICT_MESSAGE.to_string())
            }
            other => {
                tracing::error!(error = %other, "storage operation failed");
                Self::Store(other)
            }
        }
    }
}

/// `bug` -> `Bug`, for user-facing not-found messages.
fn display_entity(entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_becomes_user_facing() {
        let err: LifecycleError = StorageError::not_found("bug", 9).into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Bug not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn store_failures_hide_details() {
        let err: LifecycleError = StorageError::Connection("disk on fire".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "internal storage error");
    }

    #[test]
    fn conflict_wording_stays_in_the_store() {
        let err: LifecycleError = StorageError::conflict("UNIQUE constraint failed: users.email").into();
        assert_eq!(err.kind(), ErrorKind::BadInput);
        assert_eq!(err.to_string(), CONFLICT_MESSAGE);
    }

    #[test]
    fn reference_and_validation_are_bad_input() {
        let err = LifecycleError::Reference { field: "assignee" };
        assert_eq!(err.to_string(), "Invalid assignee selected");
        assert_eq!(err.kind(), ErrorKind::BadInput);

        let err: LifecycleError = ValidationError::NoFieldsToUpdate.into();
        assert_eq!(err.to_string(), "No fields to update");
        assert_eq!(err.kind(), ErrorKind::BadInput);
    }
}
