//! Application error types with HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Application-level errors for commgraph.
#[derive(Error, Debug)]
pub enum AppError {
    // Neo4j errors
    #[error("Neo4j connection error: {0}")]
    Connection(#[from] neo4rs::Error),

    #[error("Neo4j query error: {message}")]
    Query { message: String, query: String },

    // Domain errors
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("The database is empty!")]
    EmptyDatabase,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid identifier '{0}': only letters, digits and underscores are allowed")]
    InvalidIdentifier(String),

    // Dataset errors
    #[error("Failed to read {path}: {message}")]
    Dataset { path: String, message: String },

    // Embedding errors
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Similarity index is not ready yet")]
    IndexNotReady,

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn dataset(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        Self::Dataset {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    /// HTTP status and stable machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::EmptyDatabase => (StatusCode::NOT_FOUND, "EMPTY_DATABASE"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::InvalidIdentifier(_) => (StatusCode::BAD_REQUEST, "INVALID_IDENTIFIER"),
            AppError::IndexNotReady => (StatusCode::SERVICE_UNAVAILABLE, "INDEX_NOT_READY"),
            AppError::Connection(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONNECTION_ERROR"),
            AppError::Query { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "QUERY_ERROR"),
            AppError::Dataset { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "DATASET_ERROR"),
            AppError::Embedding(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EMBEDDING_ERROR"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
        }

        // The front end reads either `error` or `error-message`.
        let message = self.to_string();
        let body = serde_json::json!({
            "success": false,
            "code": code,
            "error": message,
            "error-message": message,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::not_found("Event", "Event_42");
        assert_eq!(err.status_and_code(), (StatusCode::NOT_FOUND, "NOT_FOUND"));
        assert_eq!(err.to_string(), "Event not found: Event_42");
    }

    #[test]
    fn test_empty_database_message() {
        assert_eq!(AppError::EmptyDatabase.to_string(), "The database is empty!");
    }

    #[test]
    fn test_index_not_ready_is_unavailable() {
        let (status, _) = AppError::IndexNotReady.status_and_code();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_dataset_error_includes_path() {
        let err = AppError::dataset("data/MC3_graph.json", "no such file");
        assert!(err.to_string().contains("data/MC3_graph.json"));
    }
}
