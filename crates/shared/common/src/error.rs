//! Unified error handling for the service and the command line.
//!
//! Provides a single error type that wraps:
//! - Domain rule violations
//! - File system and CSV failures

use std::path::PathBuf;

use domain::DomainError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Input
    #[error("{0}")]
    Validation(String),

    // Resource errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0} already exists")]
    Duplicate(String),

    // Authentication & Authorization
    #[error("No such user: {0}")]
    UserNotFound(String),

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Access denied: {0}")]
    Forbidden(String),

    // Persisted state
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Get error code for the caller
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Duplicate(_) => "DUPLICATE",
            AppError::UserNotFound(_) => "USER_NOT_FOUND",
            AppError::IncorrectPassword => "INCORRECT_PASSWORD",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::CorruptData(_) => "CORRUPT_DATA",
            AppError::FileNotFound(_) => "FILE_NOT_FOUND",
            AppError::Io(_) => "IO_ERROR",
            AppError::Csv(_) => "CSV_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Process exit code for the command line
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation(_) | AppError::Duplicate(_) => 2,
            AppError::NotFound(_) | AppError::FileNotFound(_) => 3,
            AppError::UserNotFound(_) | AppError::IncorrectPassword => 4,
            AppError::Forbidden(_) => 5,
            AppError::CorruptData(_) => 6,
            AppError::Io(_) | AppError::Csv(_) | AppError::Internal(_) => 1,
        }
    }

    /// Unknown user or wrong password
    pub fn is_authentication(&self) -> bool {
        matches!(self, AppError::UserNotFound(_) | AppError::IncorrectPassword)
    }

    /// The backing file for an entity kind does not exist yet
    pub fn is_missing_file(&self) -> bool {
        match self {
            AppError::FileNotFound(_) => true,
            AppError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Duplicate(what) if what.ends_with("already exists") => what.clone(),

            AppError::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                "A file error occurred".to_string()
            }
            AppError::Csv(e) => {
                tracing::error!("CSV error: {:?}", e);
                "A data file could not be read or written".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::NotFound(msg) => AppError::NotFound(msg),
            DomainError::Duplicate(msg) => AppError::Duplicate(msg),
            DomainError::UserNotFound(id) => AppError::UserNotFound(id),
            DomainError::IncorrectPassword => AppError::IncorrectPassword,
            DomainError::Forbidden(action) => AppError::Forbidden(action),
            DomainError::CorruptData(msg) => AppError::CorruptData(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, what: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, what: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(what.into()))
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn forbidden(action: impl Into<String>) -> Self {
        AppError::Forbidden(action.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_kind() {
        let err: AppError = DomainError::not_found("emp_deadbeef").into();
        assert_eq!(err.code(), "NOT_FOUND");

        let err: AppError = DomainError::validation("bad id").into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.user_message(), "bad id");

        let err: AppError = DomainError::IncorrectPassword.into();
        assert!(err.is_authentication());
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_missing_file_detection() {
        assert!(AppError::FileNotFound(PathBuf::from("employees.csv")).is_missing_file());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(AppError::from(io).is_missing_file());
        assert!(!AppError::validation("x").is_missing_file());
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::internal("lock poisoned at tracker.rs:12");
        assert_eq!(err.user_message(), "An internal error occurred");
    }

    #[test]
    fn test_duplicate_message_not_doubled() {
        assert_eq!(
            AppError::Duplicate("Permission payroll".into()).user_message(),
            "Permission payroll already exists"
        );
        assert_eq!(
            AppError::Duplicate("payroll already exists".into()).user_message(),
            "payroll already exists"
        );
    }

    #[test]
    fn test_ok_or_not_found() {
        let missing: Option<u8> = None;
        assert!(matches!(
            missing.ok_or_not_found("employee emp_deadbeef"),
            Err(AppError::NotFound(_))
        ));
    }
}
