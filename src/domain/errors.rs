//! Domain errors for the tokn credential registry.

use thiserror::Error;

/// Domain-level errors that can occur while managing tracked credentials.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    #[error("Credential already tracked: {0}")]
    DuplicateCredential(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Unknown backend type: {0}. Supported backends: local, doppler")]
    UnknownBackend(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<crate::domain::ports::BackendError> for DomainError {
    fn from(err: crate::domain::ports::BackendError) -> Self {
        DomainError::BackendError(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::BackendError(err.to_string())
    }
}
