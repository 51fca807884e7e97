//! Error types for Circulate
//!
//! Centralized error handling using thiserror. Business-rule outcomes that
//! are not failures (a book with no copies left, a lossy quantity
//! adjustment) are modeled as outcome enums on the services, not here.

use thiserror::Error;

/// All error types that can occur in Circulate
#[derive(Debug, Error)]
pub enum CirculateError {
    /// Book not found in storage
    #[error("Book not found: {0}")]
    BookNotFound(String),

    /// User not found in storage
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Loan not found in storage
    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    /// Loan was already returned; the return path never runs twice
    #[error("Loan already returned: {0}")]
    AlreadyReturned(String),

    /// Invalid copy count supplied to an inventory operation
    #[error("Invalid copy count: {0}")]
    InvalidCopyCount(String),

    /// Concurrent-update contention exhausted its retry budget
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Circulate operations
pub type Result<T> = std::result::Result<T, CirculateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_not_found_error() {
        let err = CirculateError::BookNotFound("book-001".to_string());
        assert_eq!(err.to_string(), "Book not found: book-001");
    }

    #[test]
    fn test_already_returned_error() {
        let err = CirculateError::AlreadyReturned("loan-42".to_string());
        assert_eq!(err.to_string(), "Loan already returned: loan-42");
    }

    #[test]
    fn test_invalid_copy_count_error() {
        let err = CirculateError::InvalidCopyCount("total_copies must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid copy count: total_copies must be at least 1"
        );
    }

    #[test]
    fn test_storage_error() {
        let err = CirculateError::Storage("file locked".to_string());
        assert_eq!(err.to_string(), "Storage error: file locked");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CirculateError = io_err.into();
        assert!(matches!(err, CirculateError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: CirculateError = json_err.into();
        assert!(matches!(err, CirculateError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(7)
        }

        fn returns_err() -> Result<i32> {
            Err(CirculateError::Conflict("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
