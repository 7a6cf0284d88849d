//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (files, CLI).

use thiserror::Error;
use validator::ValidationErrors;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Wrong shape or type for a field or id
    #[error("Validation error: {0}")]
    Validation(String),

    /// Well-formed id absent from its registry
    #[error("Not found: {0}")]
    NotFound(String),

    /// Attempted re-add of an already present record or relation
    #[error("{0} already exists")]
    Duplicate(String),

    /// Login identifier has no credential record
    #[error("No such user: {0}")]
    UserNotFound(String),

    /// Credential record exists but the password did not verify
    #[error("Incorrect password")]
    IncorrectPassword,

    /// Caller lacks the capability required for an action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Stored data failed structural validation on load
    #[error("Corrupt data: {0}")]
    CorruptData(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create a duplicate error
    pub fn duplicate(entity: impl Into<String>) -> Self {
        DomainError::Duplicate(entity.into())
    }

    /// Create a forbidden error
    pub fn forbidden(action: impl Into<String>) -> Self {
        DomainError::Forbidden(action.into())
    }

    /// Create a corrupt data error
    pub fn corrupt(msg: impl Into<String>) -> Self {
        DomainError::CorruptData(msg.into())
    }

    /// Both authentication failures ultimately deny login.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            DomainError::UserNotFound(_) | DomainError::IncorrectPassword
        )
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        // Report the first field message
        let message = errors
            .field_errors()
            .values()
            .next()
            .and_then(|errors| errors.first())
            .and_then(|error| error.message.as_ref())
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| "Validation failed".to_string());
        DomainError::Validation(message)
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
