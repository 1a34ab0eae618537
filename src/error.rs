//! Error types for gator.

use thiserror::Error;

/// Common error type for gator.
#[derive(Error, Debug)]
pub enum GatorError {
    /// Database error.
    ///
    /// Wraps errors from any database backend. Errors from sqlx are
    /// converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error (nobody logged in, unknown session user).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Resource already exists (unique constraint).
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Feed fetch or parse error.
    #[error("feed error: {0}")]
    Feed(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for GatorError {
    fn from(e: sqlx::Error) -> Self {
        GatorError::Database(e.to_string())
    }
}

/// Result type alias for gator operations.
pub type Result<T> = std::result::Result<T, GatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = GatorError::Auth("not logged in".to_string());
        assert_eq!(err.to_string(), "authentication error: not logged in");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = GatorError::NotFound("user alice".to_string());
        assert_eq!(err.to_string(), "user alice not found");
    }

    #[test]
    fn test_already_exists_error_display() {
        let err = GatorError::AlreadyExists("user bob".to_string());
        assert_eq!(err.to_string(), "user bob already exists");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GatorError = io_err.into();
        assert!(matches!(err, GatorError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: GatorError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, GatorError::Database(_)));
    }

    #[test]
    fn test_feed_error_display() {
        let err = GatorError::Feed("HTTP error: 404 Not Found".to_string());
        assert_eq!(err.to_string(), "feed error: HTTP error: 404 Not Found");
    }
}
