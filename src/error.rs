//! Error types shared by the store, the remote API and the repository.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the local SQLite store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to create database directory '{}': {1}", .0.display())]
    Directory(PathBuf, std::io::Error),

    #[error("Feature not found: {0}")]
    NotFound(String),
}

/// Errors from the remote feature service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote API not configured. Set api.base_url in config.")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Input rejected before reaching the repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Feature title cannot be empty")]
    BlankTitle,

    #[error("Feature description cannot be empty")]
    BlankDescription,

    #[error("Feature ID cannot be empty")]
    MissingId,

    #[error("Search query cannot be empty")]
    BlankQuery,
}

/// Errors surfaced by the repository and use-cases.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl From<sqlx::Error> for FeatureError {
    fn from(e: sqlx::Error) -> Self {
        FeatureError::Store(StoreError::Database(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::BlankQuery.to_string(),
            "Search query cannot be empty"
        );
        assert_eq!(
            ValidationError::MissingId.to_string(),
            "Feature ID cannot be empty"
        );
    }

    #[test]
    fn test_feature_error_is_transparent() {
        let err = FeatureError::from(RemoteError::Status {
            status: 503,
            body: "unavailable".to_string(),
        });
        assert_eq!(err.to_string(), "Server returned status 503: unavailable");

        let err = FeatureError::from(StoreError::NotFound("local_1_1000".to_string()));
        assert_eq!(err.to_string(), "Feature not found: local_1_1000");
    }
}
