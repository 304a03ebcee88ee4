//! Error types for the MySQL storage backend.

use medlab_core::CoreError;
use sqlx_core::error::Error as SqlxError;

/// Checks whether a sqlx error is MySQL's "Duplicate key name" (errno 1061),
/// raised when an index that already exists is created again.
pub fn is_duplicate_index(err: &SqlxError) -> bool {
    match err {
        SqlxError::Database(db_err) => db_err.message().contains("Duplicate key name"),
        _ => false,
    }
}

/// Errors raised by the storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database connectivity or query failure.
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    /// Schema bootstrap failure.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A stored value could not be mapped into the domain vocabulary.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Input rejected before any row was written.
    #[error("{0}")]
    Invalid(String),

    /// The referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl StoreError {
    /// Creates a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Creates a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_display() {
        let err = StoreError::schema("create failed");
        assert_eq!(err.to_string(), "Schema error: create failed");
    }

    #[test]
    fn test_config_error_display() {
        let err = StoreError::config("missing database name");
        assert_eq!(err.to_string(), "Configuration error: missing database name");
    }

    #[test]
    fn test_invalid_and_not_found_display_bare_message() {
        assert_eq!(
            StoreError::invalid("At least one test is required").to_string(),
            "At least one test is required"
        );
        assert_eq!(
            StoreError::not_found("Order not found").to_string(),
            "Order not found"
        );
    }

    #[test]
    fn test_core_error_maps_to_decode() {
        let err: StoreError = CoreError::unknown_value("status", "BOGUS").into();
        assert!(matches!(err, StoreError::Decode(_)));
        assert_eq!(err.to_string(), "Decode error: Unknown status value: BOGUS");
    }

    #[test]
    fn test_duplicate_index_ignores_non_database_errors() {
        assert!(!is_duplicate_index(&SqlxError::RowNotFound));
    }
}
