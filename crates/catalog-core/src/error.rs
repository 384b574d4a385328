//! Error types for the catalog

use crate::ports::RecordKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Backend read/write failure
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Orchestrator-level failure, one variant per HTTP outcome
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Missing required field or malformed payload
    #[error("{0}")]
    Validation(String),

    #[error("{kind} with id {id} not found")]
    NotFound { kind: RecordKind, id: i64 },

    #[error("Error {operation}: {source}")]
    Storage {
        operation: String,
        #[source]
        source: StoreError,
    },
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::Validation(message.into())
    }

    pub fn not_found(kind: RecordKind, id: i64) -> Self {
        CatalogError::NotFound { kind, id }
    }
}

/// Attach the name of the failing operation to a backend error
pub trait StoreResultExt<T> {
    fn during(self, operation: &str) -> Result<T>;
}

impl<T> StoreResultExt<T> for std::result::Result<T, StoreError> {
    fn during(self, operation: &str) -> Result<T> {
        self.map_err(|source| CatalogError::Storage {
            operation: operation.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_message_names_operation() {
        let failed: std::result::Result<(), StoreError> =
            Err(StoreError::Database("disk I/O error".to_string()));
        let err = failed.during("creating sheet").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error creating sheet: Database error: disk I/O error"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = CatalogError::not_found(RecordKind::Category, 9);
        assert_eq!(err.to_string(), "Category with id 9 not found");
    }
}
