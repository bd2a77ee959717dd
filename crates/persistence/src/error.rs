//! Error types for the persistence layer.
//!
//! Storage failures are grouped by category: resource state, validation of
//! caller input, search, and the backend itself. Every fallible operation in
//! this crate returns [`StorageResult`].

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Resource state errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Search operation errors
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors related to record state.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A stored row could not be turned back into a record.
    #[error("{entity} {id} is corrupt: {message}")]
    Corrupt {
        entity: String,
        id: i64,
        message: String,
    },
}

/// Errors caused by invalid caller input.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The record body is not acceptable.
    #[error("invalid record: {message}")]
    InvalidRecord { message: String },

    /// A sort order names a property that cannot be sorted on.
    #[error("invalid sort property: {property}")]
    InvalidSortProperty { property: String },
}

/// Errors related to search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Search query parsing failed.
    #[error("failed to parse search query: {message}")]
    QueryParseError { message: String },
}

/// Errors originating from the database or search engine.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Connection pool exhausted.
    #[error("connection pool exhausted for {backend_name}")]
    PoolExhausted { backend_name: String },

    /// Schema migration error.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

impl StorageError {
    /// Returns true when the error was caused by the caller rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StorageError::Validation(_) | StorageError::Search(SearchError::QueryParseError { .. })
        )
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Builds an internal backend error without an underlying source.
pub(crate) fn internal_error(backend_name: &str, message: impl Into<String>) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: backend_name.to_string(),
        message: message.into(),
        source: None,
    })
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Backend(BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for StorageError {
    fn from(err: r2d2::Error) -> Self {
        tracing::warn!(error = %err, "Failed to acquire SQLite connection");
        StorageError::Backend(BackendError::PoolExhausted {
            backend_name: "sqlite".to_string(),
        })
    }
}

#[cfg(feature = "elasticsearch")]
impl From<elasticsearch::Error> for StorageError {
    fn from(err: elasticsearch::Error) -> Self {
        StorageError::Backend(BackendError::Internal {
            backend_name: "elasticsearch".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Resource(ResourceError::Corrupt {
            entity: "consultation".to_string(),
            id: 42,
            message: "EOF while parsing".to_string(),
        });
        assert_eq!(err.to_string(), "consultation 42 is corrupt: EOF while parsing");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidSortProperty {
            property: "name;drop".to_string(),
        };
        assert_eq!(err.to_string(), "invalid sort property: name;drop");
    }

    #[test]
    fn test_client_error_classification() {
        let sort: StorageError = ValidationError::InvalidSortProperty {
            property: "x-y".to_string(),
        }
        .into();
        assert!(sort.is_client_error());

        let query: StorageError = SearchError::QueryParseError {
            message: "empty".to_string(),
        }
        .into();
        assert!(query.is_client_error());

        let backend = internal_error("sqlite", "disk I/O error");
        assert!(!backend.is_client_error());
        assert_eq!(
            backend.to_string(),
            "internal error in sqlite: disk I/O error"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let storage: StorageError = err.into();
        assert!(matches!(
            storage,
            StorageError::Backend(BackendError::SerializationError { .. })
        ));
    }
}
